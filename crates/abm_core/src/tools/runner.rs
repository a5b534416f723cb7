//! Command runner for external process execution.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{ToolError, ToolResult};

/// How often a running child is polled while a deadline is active.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code (`None` if the process was killed by a signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for error reporting (`-1` when killed by a signal).
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }

    /// Last `n` non-empty stderr lines, joined with newlines.
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Runs external commands with stdin closed and an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Create a runner. `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Get the configured deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `program` with `args` and capture its output.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::success`]. Exceeding the deadline kills the child.
    pub fn run(&self, program: &Path, args: &[OsString]) -> ToolResult<CommandOutput> {
        let tool = tool_name(program);

        tracing::debug!("Running {}", display_command(program, args));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                tool: tool.clone(),
                path: program.to_path_buf(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = self.wait(&mut child, &tool)?;

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }

    fn wait(&self, child: &mut Child, tool: &str) -> ToolResult<ExitStatus> {
        let io_error = |source| ToolError::Io {
            tool: tool.to_string(),
            source,
        };

        let Some(timeout) = self.timeout else {
            return child.wait().map_err(io_error);
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait().map_err(io_error)? {
                Some(status) => return Ok(status),
                None if Instant::now() >= deadline => {
                    tracing::warn!("{} exceeded {:?}, killing it", tool, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::TimedOut {
                        tool: tool.to_string(),
                        timeout,
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Short tool name for messages (`/usr/bin/ffmpeg` -> `ffmpeg`).
pub fn tool_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

/// Render a command line for logs.
pub fn display_command(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}
