//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::models::{ErrorKind, MergeStage};
use crate::playlist::PlaylistError;
use crate::tools::{DependencyError, ToolError};

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required external tool is missing (checked once, before any job).
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// A step failed during execution.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Failed to set up job (scratch directory, log file).
    #[error("Job '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Stage the job stopped at.
    pub fn stage(&self) -> Option<MergeStage> {
        match self {
            Self::Dependency(_) => Some(MergeStage::Preflight),
            Self::StepFailed { step_name, .. } => MergeStage::from_step_name(step_name),
            Self::SetupFailed { .. } => None,
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dependency(_) => ErrorKind::Dependency,
            Self::StepFailed { source, .. } => source.kind(self.stage()),
            Self::SetupFailed { .. } => ErrorKind::Io,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// The playlist could not be read, decoded or parsed.
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// No playlist entry has a backing file.
    #[error("No chapters resolved: none of the {declared} declared files exist")]
    NoChapters { declared: u32 },

    /// An external command could not be run to completion.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// An external command failed.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Failure category when raised in `stage`.
    ///
    /// External tool failures take the category of the stage that ran them.
    pub fn kind(&self, stage: Option<MergeStage>) -> ErrorKind {
        match self {
            Self::Playlist(PlaylistError::Format(_)) => ErrorKind::Format,
            Self::Playlist(PlaylistError::Encoding { .. }) => ErrorKind::Encoding,
            Self::Playlist(PlaylistError::Io { .. }) | Self::IoError { .. } => ErrorKind::Io,
            Self::InvalidInput(_)
            | Self::FileNotFound { .. }
            | Self::PreconditionFailed(_)
            | Self::NoChapters { .. } => ErrorKind::Validation,
            Self::Tool(_) | Self::CommandFailed { .. } | Self::InvalidOutput(_) => match stage {
                Some(MergeStage::Concat) => ErrorKind::Concat,
                Some(MergeStage::Mux) => ErrorKind::Mux,
                _ => ErrorKind::Io,
            },
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn step_error_displays_context() {
        let err = StepError::command_failed("ffmpeg", 1, "Invalid data found");
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid data found"));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::file_not_found("/books/x/playlist.pls");
        let pipeline_err = PipelineError::step_failed("x", "Validate", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("'x'"));
        assert!(msg.contains("Validate"));
        assert_eq!(pipeline_err.stage(), Some(MergeStage::Validate));
        assert_eq!(pipeline_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn tool_failures_take_stage_kind() {
        let concat = PipelineError::step_failed(
            "x",
            "Concat",
            StepError::command_failed("ffmpeg", 1, "boom"),
        );
        assert_eq!(concat.kind(), ErrorKind::Concat);

        let mux = PipelineError::step_failed(
            "x",
            "Mux",
            StepError::Tool(ToolError::TimedOut {
                tool: "ffmpeg".to_string(),
                timeout: Duration::from_secs(1),
            }),
        );
        assert_eq!(mux.kind(), ErrorKind::Mux);
    }

    #[test]
    fn playlist_errors_map_to_format_and_encoding() {
        let format = PipelineError::step_failed(
            "x",
            "Chapters",
            PlaylistError::format("missing entry count").into(),
        );
        assert_eq!(format.kind(), ErrorKind::Format);
        assert!(format.to_string().contains("missing entry count"));

        let encoding = StepError::from(PlaylistError::Encoding {
            encoding: "UTF-16LE".to_string(),
        });
        assert_eq!(encoding.kind(Some(MergeStage::Chapters)), ErrorKind::Encoding);
    }

    #[test]
    fn no_chapters_is_validation() {
        let err = StepError::NoChapters { declared: 3 };
        assert_eq!(err.kind(Some(MergeStage::Chapters)), ErrorKind::Validation);
        assert!(err.to_string().contains("No chapters resolved"));
    }

    #[test]
    fn dependency_is_preflight() {
        let err = PipelineError::from(DependencyError::new("ffmpeg", "not found in PATH"));
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert_eq!(err.stage(), Some(MergeStage::Preflight));
    }
}
