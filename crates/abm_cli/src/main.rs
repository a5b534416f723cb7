//! audiobook-merge
//!
//! Merges the tracks of one audiobook directory into a single chaptered
//! audio file.
//!
//! Usage:
//!   audiobook-merge /books/Solaris --title Solaris --artist "Stanisław Lem"

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use abm_core::config::{ConfigManager, Settings};
use abm_core::logging::{init_tracing, LogLevel};
use abm_core::models::{MergeJob, MergeMetadata, MergeResult};
use abm_core::orchestrator::MergeRunner;

#[derive(Parser, Debug)]
#[command(name = "audiobook-merge", author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the audio tracks and the playlist
    source_dir: PathBuf,

    /// Playlist file (default: <SOURCE_DIR>/playlist.pls)
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// Output file (default: <SOURCE_DIR>_merged.<ext> next to the source directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Title tag
    #[arg(long)]
    title: Option<String>,

    /// Artist tag
    #[arg(long)]
    artist: Option<String>,

    /// Album tag
    #[arg(long)]
    album: Option<String>,

    /// Date tag
    #[arg(long)]
    date: Option<String>,

    /// Description, written as the comment tag
    #[arg(long)]
    description: Option<String>,

    /// Cover image to embed
    #[arg(long)]
    cover: Option<PathBuf>,

    /// Configuration file, created with defaults if missing
    #[arg(short, long, env = "ABM_CONFIG")]
    config: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "ABM_FFMPEG")]
    ffmpeg: Option<String>,

    /// ffprobe executable
    #[arg(long, env = "ABM_FFPROBE")]
    ffprobe: Option<String>,

    /// Console log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<LogLevel>,
}

impl Cli {
    fn metadata(&self) -> MergeMetadata {
        MergeMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
            cover: self.cover.clone(),
        }
    }

    fn job(&self) -> MergeJob {
        let mut job = MergeJob::new(&self.source_dir).with_metadata(self.metadata());
        if let Some(playlist) = &self.playlist {
            job = job.with_playlist(playlist);
        }
        if let Some(output) = &self.output {
            job = job.with_output(output);
        }
        job
    }

    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let mut manager = ConfigManager::new(path);
                manager
                    .load_or_create()
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
                manager
                    .ensure_dirs_exist()
                    .context("Failed to create log or scratch directories")?;
                manager.into_settings()
            }
            None => Settings::default(),
        };

        if let Some(ffmpeg) = &self.ffmpeg {
            settings.tools.ffmpeg = ffmpeg.clone();
        }
        if let Some(ffprobe) = &self.ffprobe {
            settings.tools.ffprobe = ffprobe.clone();
        }
        if let Some(level) = self.log_level {
            settings.logging.level = level;
        }

        Ok(settings)
    }
}

fn run(cli: &Cli) -> Result<MergeResult> {
    let settings = cli.settings()?;
    init_tracing(settings.logging.level);

    let runner = MergeRunner::new(settings).context("Preflight failed")?;
    Ok(runner.run(&cli.job()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(result) if result.is_success() => {
            if let Some(output) = &result.output {
                println!("{}", output.display());
            }
            tracing::info!(
                "Merged {} chapters for '{}'",
                result.chapter_count,
                result.name
            );
            ExitCode::SUCCESS
        }
        Ok(result) => {
            eprintln!(
                "Error: {} ({})",
                result.error.as_deref().unwrap_or("merge failed"),
                result
                    .error_kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "Error".to_string())
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_arguments() {
        let cli = Cli::try_parse_from(["audiobook-merge", "/books/Solaris"]).unwrap();
        assert_eq!(cli.source_dir, PathBuf::from("/books/Solaris"));
        assert!(cli.playlist.is_none());

        let job = cli.job();
        assert_eq!(job.name, "Solaris");
        assert_eq!(job.playlist_path(), PathBuf::from("/books/Solaris/playlist.pls"));
    }

    #[test]
    fn parses_metadata_and_paths() {
        let cli = Cli::try_parse_from([
            "audiobook-merge",
            "/books/Solaris",
            "--playlist",
            "/books/Solaris/list.pls",
            "-o",
            "/out/solaris.m4a",
            "--title",
            "Solaris",
            "--artist",
            "Stanisław Lem",
            "--cover",
            "/books/Solaris/cover.jpg",
        ])
        .unwrap();

        let job = cli.job();
        assert_eq!(job.playlist_path(), PathBuf::from("/books/Solaris/list.pls"));
        assert_eq!(job.output_path("mp3"), PathBuf::from("/out/solaris.m4a"));
        assert_eq!(job.metadata.title.as_deref(), Some("Solaris"));
        assert_eq!(job.metadata.artist.as_deref(), Some("Stanisław Lem"));
        assert_eq!(
            job.metadata.cover,
            Some(PathBuf::from("/books/Solaris/cover.jpg"))
        );
    }

    #[test]
    fn flags_override_tool_settings() {
        let cli = Cli::try_parse_from([
            "audiobook-merge",
            "/books/Solaris",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let settings = cli.settings().unwrap();
        assert_eq!(settings.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(settings.logging.level, LogLevel::Debug);
    }

    #[test]
    fn config_file_dirs_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("abm.toml");
        let logs = dir.path().join("logs");
        let scratch = dir.path().join("scratch");
        std::fs::write(
            &config_path,
            format!(
                "[paths]\nlogs_folder = {:?}\ntemp_root = {:?}\n",
                logs.display().to_string(),
                scratch.display().to_string()
            ),
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "audiobook-merge",
            "/books/Solaris",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();
        let settings = cli.settings().unwrap();

        assert_eq!(settings.paths.logs_folder, logs.display().to_string());
        assert!(logs.is_dir());
        assert!(scratch.is_dir());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = Cli::try_parse_from(["audiobook-merge", "/books", "--log-level", "loud"]);
        assert!(err.is_err());
    }

    #[test]
    fn requires_source_dir() {
        assert!(Cli::try_parse_from(["audiobook-merge"]).is_err());
    }
}
