//! Core enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Final status of a merge job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Pending,
    Merged,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Merged => write!(f, "Merged"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Stage of the merge pipeline, used to report where a job stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStage {
    /// External tool check before any job runs.
    Preflight,
    /// Source directory, playlist and chapter checks.
    Validate,
    /// Playlist parsing, probing and timeline fold.
    Chapters,
    /// Stage A: lossless concatenation.
    Concat,
    /// Chapter metadata document.
    Metadata,
    /// Stage B: chapter, tag and cover injection.
    Mux,
}

impl MergeStage {
    /// Map a pipeline step name onto its stage.
    pub fn from_step_name(name: &str) -> Option<Self> {
        match name {
            "Preflight" => Some(Self::Preflight),
            "Validate" => Some(Self::Validate),
            "Chapters" => Some(Self::Chapters),
            "Concat" => Some(Self::Concat),
            "Metadata" => Some(Self::Metadata),
            "Mux" => Some(Self::Mux),
            _ => None,
        }
    }
}

impl std::fmt::Display for MergeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStage::Preflight => write!(f, "Preflight"),
            MergeStage::Validate => write!(f, "Validate"),
            MergeStage::Chapters => write!(f, "Chapters"),
            MergeStage::Concat => write!(f, "Concat"),
            MergeStage::Metadata => write!(f, "Metadata"),
            MergeStage::Mux => write!(f, "Mux"),
        }
    }
}

/// Failure category reported for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A required external tool is missing. Fatal for the whole process.
    Dependency,
    /// The playlist is malformed.
    Format,
    /// The playlist text cannot be decoded.
    Encoding,
    /// Bad paths or no chapters to merge.
    Validation,
    /// Stage A failed.
    Concat,
    /// Stage B failed.
    Mux,
    /// Scratch or output filesystem failure.
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Dependency => write!(f, "DependencyError"),
            ErrorKind::Format => write!(f, "FormatError"),
            ErrorKind::Encoding => write!(f, "EncodingError"),
            ErrorKind::Validation => write!(f, "ValidationError"),
            ErrorKind::Concat => write!(f, "ConcatError"),
            ErrorKind::Mux => write!(f, "MuxError"),
            ErrorKind::Io => write!(f, "IoError"),
        }
    }
}
