//! Pipeline orchestrator for coordinating merge jobs.
//!
//! This module provides the infrastructure for running the merge
//! pipeline. Each job consists of a sequence of steps that validate,
//! execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! MergeRunner (preflight: ffmpeg + ffprobe)
//!     └── Pipeline (per job, private scratch directory)
//!         ├── Step: Validate
//!         ├── Step: Chapters
//!         ├── Step: Concat     (Stage A)
//!         ├── Step: Metadata
//!         └── Step: Mux        (Stage B)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use abm_core::models::MergeJob;
//! use abm_core::orchestrator::MergeRunner;
//!
//! let runner = MergeRunner::new(settings)?;
//! let result = runner.run(&MergeJob::new("/books/Solaris"));
//! println!("{:?}", result.output);
//! ```

mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use runner::MergeRunner;
pub use step::PipelineStep;
pub use steps::{ChaptersStep, ConcatStep, MetadataStep, MuxStep, ValidateStep};
pub use types::{
    ChaptersOutput, ConcatOutput, Context, JobState, MetadataOutput, MuxOutput, ValidatedInputs,
};

/// Create the merge pipeline with all steps in the correct order.
///
/// 1. Validate - source directory, playlist and output path
/// 2. Chapters - parse playlist, probe missing durations, build timeline
/// 3. Concat - join tracks losslessly (Stage A)
/// 4. Metadata - write the ffmetadata document
/// 5. Mux - inject chapters, tags and cover (Stage B), then publish
pub fn create_merge_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ValidateStep::new())
        .with_step(ChaptersStep::new())
        .with_step(ConcatStep::new())
        .with_step(MetadataStep::new())
        .with_step(MuxStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_pipeline_order() {
        assert_eq!(
            create_merge_pipeline().step_names(),
            vec!["Validate", "Chapters", "Concat", "Metadata", "Mux"]
        );
    }
}
