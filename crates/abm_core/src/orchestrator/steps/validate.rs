//! Validate step - checks the job's paths before anything is read.

use std::fs;

use crate::models::derived_output_path;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, ValidatedInputs};

/// Checks the source directory, playlist and output location.
pub struct ValidateStep;

impl ValidateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ValidateStep {
    fn name(&self) -> &str {
        "Validate"
    }

    fn description(&self) -> &str {
        "Check source directory, playlist and output path"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let source_dir = &ctx.job.source_dir;
        if !source_dir.exists() {
            return Err(StepError::file_not_found(source_dir.display().to_string()));
        }
        if !source_dir.is_dir() {
            return Err(StepError::invalid_input(format!(
                "Source is not a directory: {}",
                source_dir.display()
            )));
        }

        let playlist = ctx.job.playlist_path();
        if !playlist.is_file() {
            return Err(StepError::file_not_found(playlist.display().to_string()));
        }

        let output = ctx.output_path();
        if output.is_dir() {
            return Err(StepError::invalid_input(format!(
                "Output path is a directory: {}",
                output.display()
            )));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let source_dir = fs::canonicalize(&ctx.job.source_dir)
            .map_err(|e| StepError::io_error("resolving source directory", e))?;
        let playlist = ctx.job.playlist_path();
        let output_path = ctx.job.output.clone().unwrap_or_else(|| {
            derived_output_path(&source_dir, &ctx.settings.output.extension)
        });

        ctx.logger
            .validation(&format!("Source: {}", source_dir.display()));
        ctx.logger
            .validation(&format!("Playlist: {}", playlist.display()));
        ctx.logger
            .validation(&format!("Output: {}", output_path.display()));

        state.validated = Some(ValidatedInputs {
            source_dir,
            playlist,
            output_path,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.validated.is_none() {
            return Err(StepError::invalid_output("Validated inputs not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergeJob;
    use crate::orchestrator::types::test_context;

    #[test]
    fn missing_source_dir_fails() {
        let (ctx, _dir) = test_context();
        let err = ValidateStep::new().validate_input(&ctx).unwrap_err();
        assert!(matches!(err, StepError::FileNotFound { .. }));
    }

    #[test]
    fn missing_playlist_fails() {
        let (ctx, dir) = test_context();
        fs::create_dir_all(dir.path().join("book")).unwrap();

        let err = ValidateStep::new().validate_input(&ctx).unwrap_err();
        assert!(err.to_string().contains("playlist.pls"));
    }

    #[test]
    fn records_absolute_paths() {
        let (ctx, dir) = test_context();
        let book = dir.path().join("book");
        fs::create_dir_all(&book).unwrap();
        fs::write(book.join("playlist.pls"), "NumberOfEntries=0\n").unwrap();

        let step = ValidateStep::new();
        let mut state = JobState::new("job");
        step.validate_input(&ctx).unwrap();
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();

        let validated = state.validated.unwrap();
        assert!(validated.source_dir.is_absolute());
        assert!(validated.playlist.ends_with("playlist.pls"));
        assert!(validated.output_path.ends_with("book_merged.mp3"));
    }

    #[test]
    fn output_derives_from_resolved_source_dir() {
        let (ctx, dir) = test_context();
        let book = dir.path().join("book");
        fs::create_dir_all(book.join("cd1")).unwrap();
        fs::write(book.join("playlist.pls"), "NumberOfEntries=0\n").unwrap();

        let mut ctx = ctx;
        ctx.job = MergeJob::new(book.join("cd1").join(".."));

        let mut state = JobState::new("job");
        ValidateStep::new().execute(&ctx, &mut state).unwrap();

        let validated = state.validated.unwrap();
        let real_dir = dir.path().canonicalize().unwrap();
        assert_eq!(validated.source_dir, real_dir.join("book"));
        assert_eq!(validated.output_path, real_dir.join("book_merged.mp3"));
    }
}
