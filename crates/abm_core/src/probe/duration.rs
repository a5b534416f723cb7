//! Duration probing with ffprobe.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tools::{tool_name, CommandRunner};

/// Resolves the duration of a media file in seconds.
///
/// `None` means the duration could not be determined. Implementations must
/// be pure per file so calls can run in parallel.
pub trait DurationResolver: Send + Sync {
    fn resolve(&self, path: &Path) -> Option<f64>;
}

impl<F> DurationResolver for F
where
    F: Fn(&Path) -> Option<f64> + Send + Sync,
{
    fn resolve(&self, path: &Path) -> Option<f64> {
        self(path)
    }
}

/// Resolver backed by `ffprobe -show_entries format=duration`.
#[derive(Debug, Clone)]
pub struct FfprobeResolver {
    ffprobe: PathBuf,
    runner: CommandRunner,
}

impl FfprobeResolver {
    /// Create a resolver for the given ffprobe executable.
    pub fn new(ffprobe: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            runner: CommandRunner::new(timeout),
        }
    }

    fn args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(path.as_os_str().to_os_string());
        args
    }
}

impl DurationResolver for FfprobeResolver {
    fn resolve(&self, path: &Path) -> Option<f64> {
        let tool = tool_name(&self.ffprobe);

        let output = match self.runner.run(&self.ffprobe, &Self::args(path)) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Could not determine duration for {}: {}", path.display(), e);
                return None;
            }
        };

        if !output.success() {
            tracing::warn!(
                "{} failed for {} (exit code {}): {}",
                tool,
                path.display(),
                output.code(),
                output.stderr_tail(3)
            );
            return None;
        }

        let duration = parse_duration_output(&output.stdout);
        if duration.is_none() {
            tracing::warn!(
                "{} returned no usable duration for {}: '{}'",
                tool,
                path.display(),
                output.stdout.trim()
            );
        }
        duration
    }
}

/// Parse ffprobe's duration output (`"123.456000\n"`).
///
/// Rejects non-numeric (`N/A`), negative and non-finite values.
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    let value: f64 = stdout.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration_output("10.000000\n"), Some(10.0));
        assert_eq!(parse_duration_output("  0.5 "), Some(0.5));
    }

    #[test]
    fn rejects_unusable_output() {
        assert_eq!(parse_duration_output("N/A\n"), None);
        assert_eq!(parse_duration_output(""), None);
        assert_eq!(parse_duration_output("-3.0"), None);
        assert_eq!(parse_duration_output("inf"), None);
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |_: &Path| Some(2.5);
        assert_eq!(resolver.resolve(Path::new("a.mp3")), Some(2.5));
    }

    #[test]
    fn missing_ffprobe_yields_unknown() {
        let resolver = FfprobeResolver::new("/nonexistent/ffprobe", None);
        assert_eq!(resolver.resolve(Path::new("a.mp3")), None);
    }

    #[cfg(unix)]
    #[test]
    fn failing_ffprobe_yields_unknown() {
        let resolver = FfprobeResolver::new("/bin/false", None);
        assert_eq!(resolver.resolve(Path::new("a.mp3")), None);
    }
}
