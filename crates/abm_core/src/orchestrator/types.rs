//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chapters::Timeline;
use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::MergeJob;
use crate::probe::DurationResolver;
use crate::tools::{CommandRunner, ToolPaths};

/// Read-only context passed to pipeline steps.
///
/// Contains job configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// The merge job being processed.
    pub job: MergeJob,
    /// Application settings.
    pub settings: Settings,
    /// Validated external tools.
    pub tools: ToolPaths,
    /// Duration source for tracks without a declared length.
    pub resolver: Arc<dyn DurationResolver>,
    /// Job name/identifier.
    pub job_name: String,
    /// Job-private scratch directory.
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        job: MergeJob,
        settings: Settings,
        tools: ToolPaths,
        resolver: Arc<dyn DurationResolver>,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            job_name: job.name.clone(),
            job,
            settings,
            tools,
            resolver,
            work_dir,
            logger,
        }
    }

    /// Final output path of the job.
    pub fn output_path(&self) -> PathBuf {
        self.job.output_path(&self.settings.output.extension)
    }

    /// Runner for transcoder passes, with the configured deadline.
    pub fn transcoder(&self) -> CommandRunner {
        CommandRunner::new(self.settings.tools.command_timeout())
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Each step's output is stored in its own section and written once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Checked inputs (from Validate step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated: Option<ValidatedInputs>,
    /// Chapter timeline (from Chapters step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<ChaptersOutput>,
    /// Stage A results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concat: Option<ConcatOutput>,
    /// Chapter metadata document (from Metadata step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataOutput>,
    /// Stage B results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mux: Option<MuxOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Chapter timeline, if resolved.
    pub fn timeline(&self) -> Option<&Timeline> {
        self.chapters.as_ref().map(|c| &c.timeline)
    }
}

/// Output from the Validate step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedInputs {
    /// Absolute source directory.
    pub source_dir: PathBuf,
    /// Playlist to parse.
    pub playlist: PathBuf,
    /// Final output path.
    pub output_path: PathBuf,
}

/// Output from the Chapters step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaptersOutput {
    /// `NumberOfEntries` from the playlist.
    pub declared_entries: u32,
    /// Detected playlist encoding.
    pub encoding: String,
    /// Number of files handed to the probe.
    pub probed: usize,
    /// Resolved chapters.
    pub timeline: Timeline,
}

/// Output from the Concat step (Stage A).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcatOutput {
    /// Concat-demuxer list file.
    pub list_path: PathBuf,
    /// Lossless intermediate.
    pub intermediate: PathBuf,
    /// Number of concatenated files.
    pub file_count: usize,
    /// ffmpeg command that was run.
    pub command: String,
}

/// Output from the Metadata step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataOutput {
    /// ffmetadata document path.
    pub document: PathBuf,
    /// Number of chapter blocks written.
    pub chapter_count: usize,
    /// Number of global tags written.
    pub tag_count: usize,
}

/// Output from the Mux step (Stage B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuxOutput {
    /// Path to final merged file.
    pub output_path: PathBuf,
    /// Whether a cover image was attached.
    pub cover_attached: bool,
    /// ffmpeg command that was run.
    pub command: String,
}

#[cfg(test)]
pub(crate) fn test_context() -> (Context, tempfile::TempDir) {
    use crate::logging::LogConfig;

    let dir = tempfile::TempDir::new().unwrap();
    let logger = JobLogger::new("test", dir.path().join("logs"), LogConfig::default()).unwrap();
    let resolver: Arc<dyn DurationResolver> = Arc::new(|_: &std::path::Path| Some(1.0));
    let ctx = Context::new(
        MergeJob::new(dir.path().join("book")),
        Settings::default(),
        ToolPaths {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        },
        resolver,
        dir.path().join("work"),
        Arc::new(logger),
    );
    (ctx, dir)
}
