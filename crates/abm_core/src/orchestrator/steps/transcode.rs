//! Shared ffmpeg invocation for the Concat and Mux steps.

use std::ffi::OsString;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::types::Context;
use crate::tools::{display_command, tool_name, CommandOutput};

/// Run ffmpeg with `args`, logging the command and its output.
///
/// Returns the command line that was run. A non-zero exit dumps the
/// output tail into the job log and fails the step.
pub(super) fn run_transcoder(ctx: &Context, args: &[OsString]) -> StepResult<String> {
    let ffmpeg = &ctx.tools.ffmpeg;
    let command = display_command(ffmpeg, args);

    ctx.logger.command(&command);
    if ctx.settings.logging.show_options_pretty {
        ctx.logger.log_ffmpeg_options_pretty(args);
    }
    if ctx.settings.logging.show_options_json {
        ctx.logger.log_ffmpeg_options_json(args);
    }

    ctx.logger.clear_tail();
    let output = ctx.transcoder().run(ffmpeg, args)?;
    log_output(ctx, &output);

    if !output.success() {
        let tool = tool_name(ffmpeg);
        ctx.logger.show_tail(&tool);
        return Err(StepError::command_failed(
            tool,
            output.code(),
            output.stderr_tail(3),
        ));
    }

    Ok(command)
}

fn log_output(ctx: &Context, output: &CommandOutput) {
    if !output.stdout.is_empty() {
        ctx.logger.tool_output(&output.stdout, false);
    }
    if !output.stderr.is_empty() {
        ctx.logger.tool_output(&output.stderr, true);
    }
}
