//! Metadata step - writes the ffmetadata document for Stage B.

use crate::chapters::write_ffmetadata;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, MetadataOutput};

/// File name of the chapter metadata document inside the scratch directory.
const DOCUMENT_FILE_NAME: &str = "chapters.txt";

/// Serializes tags and chapter markers.
pub struct MetadataStep;

impl MetadataStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MetadataStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MetadataStep {
    fn name(&self) -> &str {
        "Metadata"
    }

    fn description(&self) -> &str {
        "Write chapter metadata document"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let timeline = state
            .timeline()
            .ok_or_else(|| StepError::precondition_failed("Chapters have not been resolved"))?;

        let document = ctx.work_dir.join(DOCUMENT_FILE_NAME);
        write_ffmetadata(&document, &ctx.job.metadata, &timeline.chapters)
            .map_err(|e| StepError::io_error("writing chapter metadata", e))?;

        let tag_count = ctx.job.metadata.tags().len();
        let chapter_count = timeline.len();
        ctx.logger.info(&format!(
            "Wrote {} chapter(s) and {} tag(s) to {}",
            chapter_count,
            tag_count,
            document.display()
        ));

        state.metadata = Some(MetadataOutput {
            document,
            chapter_count,
            tag_count,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let metadata = state
            .metadata
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Metadata results not recorded"))?;

        if !metadata.document.is_file() {
            return Err(StepError::invalid_output(format!(
                "Metadata document not created: {}",
                metadata.document.display()
            )));
        }

        Ok(())
    }
}
