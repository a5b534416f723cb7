//! External tool execution.
//!
//! - **Runner**: run ffmpeg/ffprobe with captured output and a deadline
//! - **Validator**: preflight check that the required tools are invocable

mod runner;
mod validator;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use runner::{display_command, tool_name, CommandOutput, CommandRunner};
pub use validator::{find_in_path, validate_tools, DependencyError, ToolPaths};

/// Errors from running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to start {tool} ({}): {source}", path.display())]
    Spawn {
        tool: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{tool} did not finish within {timeout:?} and was killed")]
    TimedOut { tool: String, timeout: Duration },

    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
