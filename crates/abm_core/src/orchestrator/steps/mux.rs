//! Mux step - Stage B, injects chapters, tags and cover art.
//!
//! ffmpeg writes into the scratch directory; the finished file is then
//! moved to the output path, so a failed run never leaves a partial file
//! at the final location.

use std::fs;
use std::path::{Path, PathBuf};

use crate::mux::{publish_output, MuxOptionsBuilder};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, MuxOutput};

use super::transcode::run_transcoder;

/// Remuxes the intermediate with the metadata document (and cover).
pub struct MuxStep;

impl MuxStep {
    pub fn new() -> Self {
        Self
    }

    /// Cover image to attach, if one is configured and present.
    fn cover<'a>(&self, ctx: &'a Context) -> Option<&'a Path> {
        let cover = ctx.job.metadata.cover.as_deref()?;
        if cover.is_file() {
            ctx.logger
                .info(&format!("Attaching cover: {}", cover.display()));
            Some(cover)
        } else {
            ctx.logger.warn(&format!(
                "Cover image not found, continuing without it: {}",
                cover.display()
            ));
            None
        }
    }

    /// Scratch file ffmpeg writes to, with the output's extension.
    fn staging_path(&self, ctx: &Context, output_path: &Path) -> PathBuf {
        let extension = output_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| ctx.settings.output.extension.trim_start_matches('.').to_string());
        ctx.work_dir.join(format!("merged.{}", extension))
    }
}

impl Default for MuxStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MuxStep {
    fn name(&self) -> &str {
        "Mux"
    }

    fn description(&self) -> &str {
        "Inject chapters, tags and cover with ffmpeg"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let intermediate = state
            .concat
            .as_ref()
            .map(|c| c.intermediate.clone())
            .ok_or_else(|| StepError::precondition_failed("Tracks have not been concatenated"))?;
        let document = state
            .metadata
            .as_ref()
            .map(|m| m.document.clone())
            .ok_or_else(|| StepError::precondition_failed("Metadata document not written"))?;
        let output_path = state
            .validated
            .as_ref()
            .map(|v| v.output_path.clone())
            .unwrap_or_else(|| ctx.output_path());

        let cover = self.cover(ctx);
        let staging = self.staging_path(ctx, &output_path);

        let args = MuxOptionsBuilder::new(&intermediate, &document, &ctx.job.metadata, &staging)
            .with_cover(cover)
            .with_id3v2_version(ctx.settings.output.id3v2_version)
            .build();

        let command = run_transcoder(ctx, &args)?;

        check_staged(&staging)?;

        publish_output(&staging, &output_path)
            .map_err(|e| StepError::io_error("moving merged file into place", e))?;

        state.mux = Some(MuxOutput {
            output_path: output_path.clone(),
            cover_attached: cover.is_some(),
            command,
        });

        ctx.logger.success(&format!(
            "Merged to: {}",
            output_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let mux = state
            .mux
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Mux results not recorded"))?;

        let size = fs::metadata(&mux.output_path)
            .map(|m| m.len())
            .map_err(|_| {
                StepError::invalid_output(format!(
                    "Output file not created: {}",
                    mux.output_path.display()
                ))
            })?;
        if size == 0 {
            return Err(StepError::invalid_output(format!(
                "Output file is empty: {}",
                mux.output_path.display()
            )));
        }

        Ok(())
    }
}

/// The staged file must exist and be non-empty before it is published.
fn check_staged(staging: &Path) -> StepResult<()> {
    let size = fs::metadata(staging).map(|m| m.len()).map_err(|_| {
        StepError::invalid_output(format!(
            "ffmpeg reported success but wrote no file: {}",
            staging.display()
        ))
    })?;
    if size == 0 {
        return Err(StepError::invalid_output(format!(
            "ffmpeg reported success but wrote an empty file: {}",
            staging.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::types::test_context;

    #[test]
    fn mux_step_has_correct_name() {
        assert_eq!(MuxStep::new().name(), "Mux");
    }

    #[test]
    fn missing_cover_is_skipped() {
        let (mut ctx, dir) = test_context();
        ctx.job.metadata.cover = Some(dir.path().join("cover.jpg"));
        assert!(MuxStep::new().cover(&ctx).is_none());

        std::fs::write(dir.path().join("cover.jpg"), b"jpeg").unwrap();
        assert!(MuxStep::new().cover(&ctx).is_some());
    }

    #[test]
    fn staging_follows_output_extension() {
        let (ctx, _dir) = test_context();
        let staging = MuxStep::new().staging_path(&ctx, Path::new("/out/book.m4b"));
        assert_eq!(staging, ctx.work_dir.join("merged.m4b"));

        let staging = MuxStep::new().staging_path(&ctx, Path::new("/out/book"));
        assert_eq!(staging, ctx.work_dir.join("merged.mp3"));
    }

    #[test]
    fn empty_or_missing_staging_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("merged.mp3");
        assert!(check_staged(&staging).is_err());

        std::fs::write(&staging, b"").unwrap();
        let err = check_staged(&staging).unwrap_err();
        assert!(err.to_string().contains("empty file"));

        std::fs::write(&staging, b"audio").unwrap();
        assert!(check_staged(&staging).is_ok());
    }

    #[test]
    fn requires_concat_output() {
        let (ctx, _dir) = test_context();
        let mut state = JobState::new("job");
        let err = MuxStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::PreconditionFailed(_)));
    }
}
