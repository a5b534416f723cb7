//! Concat step - Stage A, lossless concatenation of the track files.

use crate::mux::{concat_args, plan_concat};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{ConcatOutput, Context, JobState};

use super::transcode::run_transcoder;

/// File name of the concat-demuxer list inside the scratch directory.
const LIST_FILE_NAME: &str = "concat.txt";

/// Joins all tracks into one intermediate with stream copy.
pub struct ConcatStep;

impl ConcatStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConcatStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConcatStep {
    fn name(&self) -> &str {
        "Concat"
    }

    fn description(&self) -> &str {
        "Concatenate tracks losslessly with the ffmpeg concat demuxer"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.work_dir.is_dir() {
            return Err(StepError::precondition_failed(format!(
                "Scratch directory missing: {}",
                ctx.work_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let timeline = state
            .timeline()
            .ok_or_else(|| StepError::precondition_failed("Chapters have not been resolved"))?;

        let plan = plan_concat(&timeline.chapters);
        if plan.is_empty() {
            return Err(StepError::precondition_failed("Nothing to concatenate"));
        }

        let list_path = ctx.work_dir.join(LIST_FILE_NAME);
        plan.write_list(&list_path)
            .map_err(|e| StepError::io_error("writing concat list", e))?;

        let intermediate = ctx.work_dir.join(plan.intermediate_name());
        ctx.logger.info(&format!(
            "Concatenating {} file(s) into {}",
            plan.len(),
            intermediate.display()
        ));

        let command = run_transcoder(ctx, &concat_args(&list_path, &intermediate))?;

        state.concat = Some(ConcatOutput {
            list_path,
            intermediate,
            file_count: plan.len(),
            command,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let concat = state
            .concat
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Concat results not recorded"))?;

        if !concat.intermediate.is_file() {
            return Err(StepError::invalid_output(format!(
                "Intermediate not created: {}",
                concat.intermediate.display()
            )));
        }

        Ok(())
    }
}
