//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Scratch and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool locations and deadlines.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Duration probing.
    #[serde(default)]
    pub probe: ProbeSettings,

    /// Merged file output.
    #[serde(default)]
    pub output: OutputSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for scratch space and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Parent folder for per-job scratch directories.
    /// Empty uses the system temp directory.
    #[serde(default)]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Scratch parent, or `None` for the system temp directory.
    pub fn temp_root(&self) -> Option<PathBuf> {
        let trimmed = self.temp_root.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// External tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// ffmpeg executable (name on PATH or full path).
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe executable (name on PATH or full path).
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    /// Deadline for each ffmpeg pass in seconds (0 = none).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Deadline for each ffprobe call in seconds (0 = none).
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_command_timeout() -> u64 {
    3600
}

fn default_probe_timeout() -> u64 {
    30
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            command_timeout_secs: default_command_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl ToolSettings {
    /// Deadline for transcoder passes.
    pub fn command_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.command_timeout_secs)
    }

    /// Deadline for probe calls.
    pub fn probe_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.probe_timeout_secs)
    }
}

fn secs_to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Duration probing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Maximum number of probes running at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ProbeSettings {
    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Extension for derived output names.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// ID3v2 version written to mp3 output (0 = ffmpeg default).
    #[serde(default = "default_id3v2_version")]
    pub id3v2_version: u8,
}

fn default_extension() -> String {
    "mp3".to_string()
}

fn default_id3v2_version() -> u8 {
    3
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            id3v2_version: default_id3v2_version(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console output.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep raw tool output out of the job log (still kept for the error tail).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show when a stage fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Show ffmpeg options in pretty format.
    #[serde(default)]
    pub show_options_pretty: bool,

    /// Show ffmpeg options as raw JSON.
    #[serde(default)]
    pub show_options_json: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            show_options_pretty: false,
            show_options_json: false,
        }
    }
}

impl LoggingSettings {
    /// Build the job logger configuration.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            error_tail: self.error_tail as usize,
            ..LogConfig::default()
        }
    }
}

/// Config sections that can be updated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Tools,
    Probe,
    Output,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Tools,
        ConfigSection::Probe,
        ConfigSection::Output,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Probe => "probe",
            ConfigSection::Output => "output",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Scratch and log directories",
            ConfigSection::Tools => "External tools (ffmpeg, ffprobe) and their deadlines",
            ConfigSection::Probe => "Duration probing",
            ConfigSection::Output => "Merged file output",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[tools]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("command_timeout_secs = 3600"));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.tools.ffmpeg, settings.tools.ffmpeg);
        assert_eq!(parsed.logging.level, settings.logging.level);
        assert_eq!(parsed.probe.max_concurrency, 4);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[tools]\nffmpeg = \"/opt/ffmpeg/bin/ffmpeg\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(parsed.tools.ffprobe, "ffprobe");
        assert_eq!(parsed.output.extension, "mp3");
        assert_eq!(parsed.output.id3v2_version, 3);
        assert_eq!(parsed.paths.logs_folder, ".logs");
    }

    #[test]
    fn zero_timeouts_disable_deadlines() {
        let tools = ToolSettings {
            command_timeout_secs: 0,
            probe_timeout_secs: 5,
            ..ToolSettings::default()
        };
        assert_eq!(tools.command_timeout(), None);
        assert_eq!(tools.probe_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let probe = ProbeSettings { max_concurrency: 0 };
        assert_eq!(probe.concurrency(), 1);
    }

    #[test]
    fn empty_temp_root_means_system_temp() {
        assert_eq!(PathSettings::default().temp_root(), None);
        let paths = PathSettings {
            temp_root: "/scratch".to_string(),
            ..PathSettings::default()
        };
        assert_eq!(paths.temp_root(), Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn log_level_is_lowercase() {
        let parsed: Settings = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.logging.level, LogLevel::Debug);
    }
}
