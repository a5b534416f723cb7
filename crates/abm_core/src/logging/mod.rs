//! Logging infrastructure.
//!
//! This module provides:
//! - Per-job loggers writing a log file and mirroring to `tracing`
//! - Compact mode for external tool output
//! - Tail buffer for error diagnosis
//! - Global `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use abm_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("my_book", "/path/to/logs", LogConfig::default()).unwrap();
//!
//! logger.phase("Concat");
//! logger.command("ffmpeg -f concat -safe 0 -i list.txt ...");
//! logger.success("Merged 12 chapters");
//! ```

mod job_logger;
mod types;

pub use job_logger::{sanitize_filename, JobLogger};
pub use types::{LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.as_str(), "info");
    }

    #[test]
    fn test_tracing_can_be_installed_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
