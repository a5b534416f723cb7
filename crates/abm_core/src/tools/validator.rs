//! Preflight validation of the external tools.
//!
//! Runs once per process, before any job: a missing ffmpeg or ffprobe is
//! fatal for every job, so it is reported up front.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::runner::CommandRunner;

/// Deadline for `-version` calls.
const VERSION_TIMEOUT: Duration = Duration::from_secs(15);

/// A required external tool is missing or not invocable.
#[derive(Error, Debug)]
#[error("Required tool '{tool}' is not available: {reason}")]
pub struct DependencyError {
    pub tool: String,
    pub reason: String,
}

impl DependencyError {
    pub fn new(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Resolved locations of the required tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Locate ffmpeg and ffprobe and check that both answer `-version`.
///
/// `ffmpeg` and `ffprobe` may be bare names (searched in `PATH`) or paths.
pub fn validate_tools(ffmpeg: &str, ffprobe: &str) -> Result<ToolPaths, DependencyError> {
    Ok(ToolPaths {
        ffmpeg: validate_tool(ffmpeg)?,
        ffprobe: validate_tool(ffprobe)?,
    })
}

fn validate_tool(configured: &str) -> Result<PathBuf, DependencyError> {
    let path = locate(configured)
        .ok_or_else(|| DependencyError::new(configured, "not found in PATH"))?;

    let runner = CommandRunner::new(Some(VERSION_TIMEOUT));
    let output = runner
        .run(&path, &[OsString::from("-version")])
        .map_err(|e| DependencyError::new(configured, e.to_string()))?;

    if !output.success() {
        return Err(DependencyError::new(
            configured,
            format!("'-version' exited with code {}", output.code()),
        ));
    }

    let version = output.stdout.lines().next().unwrap_or_default();
    tracing::info!("Using {} ({})", path.display(), version.trim());

    Ok(path)
}

fn locate(configured: &str) -> Option<PathBuf> {
    let candidate = Path::new(configured);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    find_in_path(configured)
}

/// Search `PATH` for an executable named `tool`.
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let full = dir.join(tool);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{tool}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
