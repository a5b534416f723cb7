//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use abm_core::config::ConfigManager;
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/audiobook-merge.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("ffmpeg: {}", config.settings().tools.ffmpeg);
//!
//! // Create the log and scratch directories it names
//! config.ensure_dirs_exist().unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, OutputSettings, PathSettings, ProbeSettings, Settings,
    ToolSettings,
};
