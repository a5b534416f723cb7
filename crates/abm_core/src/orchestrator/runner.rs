//! Merge runner: preflight once, then one pipeline run per job.
//!
//! Every job gets its own scratch directory and log file. The scratch
//! directory is removed when the job ends, whatever the outcome.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{MergeJob, MergeResult};
use crate::probe::{DurationResolver, FfprobeResolver};
use crate::tools::{validate_tools, ToolPaths};

use super::create_merge_pipeline;
use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, JobState};

/// Runs merge jobs through the standard pipeline.
///
/// # Example
///
/// ```ignore
/// let runner = MergeRunner::new(settings)?;
/// let result = runner.run(&MergeJob::new("/books/Solaris"));
/// assert!(result.is_success());
/// ```
pub struct MergeRunner {
    /// Application settings.
    settings: Settings,
    /// Validated external tools.
    tools: ToolPaths,
    /// Duration source shared by all jobs.
    resolver: Arc<dyn DurationResolver>,
}

impl MergeRunner {
    /// Check the external tools and create a runner.
    ///
    /// Fails with `PipelineError::Dependency` when ffmpeg or ffprobe is
    /// missing; no job can run in that case.
    pub fn new(settings: Settings) -> PipelineResult<Self> {
        let tools = validate_tools(&settings.tools.ffmpeg, &settings.tools.ffprobe)?;
        let resolver: Arc<dyn DurationResolver> = Arc::new(FfprobeResolver::new(
            tools.ffprobe.clone(),
            settings.tools.probe_timeout(),
        ));

        Ok(Self {
            settings,
            tools,
            resolver,
        })
    }

    /// Replace the duration resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn DurationResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the validated tool paths.
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Run one job to completion.
    pub fn run(&self, job: &MergeJob) -> MergeResult {
        match self.try_run(job) {
            Ok((output, chapter_count)) => MergeResult::merged(&job.name, output, chapter_count),
            Err(e) => {
                tracing::error!("{}", e);
                MergeResult::failed(&job.name, e.stage(), e.kind(), e.to_string())
            }
        }
    }

    fn try_run(&self, job: &MergeJob) -> PipelineResult<(PathBuf, usize)> {
        let scratch = self.create_scratch(job)?;

        let logger = JobLogger::new(
            &job.name,
            &self.settings.paths.logs_folder,
            self.settings.logging.log_config(),
        )
        .map_err(|e| {
            PipelineError::setup_failed(&job.name, format!("Failed to create logger: {}", e))
        })?;

        let ctx = Context::new(
            job.clone(),
            self.settings.clone(),
            self.tools.clone(),
            Arc::clone(&self.resolver),
            scratch.path().to_path_buf(),
            Arc::new(logger),
        );

        ctx.logger.info(&format!("Starting job: {}", job.name));
        ctx.logger
            .debug(&format!("Scratch directory: {}", ctx.work_dir.display()));

        let mut state = JobState::new(&job.name);
        let run = create_merge_pipeline().run(&ctx, &mut state);

        if let Err(e) = scratch.close() {
            ctx.logger
                .warn(&format!("Failed to remove scratch directory: {}", e));
        }

        let result = match run {
            Ok(_) => {
                let output = state
                    .mux
                    .map(|m| m.output_path)
                    .or_else(|| state.validated.map(|v| v.output_path))
                    .unwrap_or_else(|| ctx.output_path());
                let chapter_count = state.metadata.map(|m| m.chapter_count).unwrap_or(0);
                ctx.logger.success(&format!("Job completed: {}", output.display()));
                Ok((output, chapter_count))
            }
            Err(e) => {
                ctx.logger.error(&format!("Pipeline failed: {}", e));
                Err(e)
            }
        };

        ctx.logger.close();
        result
    }

    fn create_scratch(&self, job: &MergeJob) -> PipelineResult<TempDir> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("abm-");
            builder
        };

        let scratch = match self.settings.paths.temp_root() {
            Some(root) => std::fs::create_dir_all(&root).and_then(|_| builder.tempdir_in(&root)),
            None => builder.tempdir(),
        };

        scratch.map_err(|e| {
            PipelineError::setup_failed(
                &job.name,
                format!("Failed to create scratch directory: {}", e),
            )
        })
    }
}
