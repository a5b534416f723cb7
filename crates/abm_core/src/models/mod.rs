//! Data models for audiobook merging.
//!
//! - Enums for job status and pipeline stages
//! - Descriptive metadata applied to the merged file
//! - Job structures (merge job, merge result)

mod enums;
mod jobs;
mod metadata;

pub use enums::{ErrorKind, JobStatus, MergeStage};
pub use jobs::{derived_output_path, resolve_dir, MergeJob, MergeResult, DEFAULT_PLAYLIST_NAME};
pub use metadata::MergeMetadata;
