//! Playlist types and error definitions.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One playlist entry, immutable once parsed.
///
/// Default rules:
/// - `title` falls back to the file stem of `filename` when `Title{i}` is
///   absent or blank.
/// - `declared_length_secs` is `0.0` when `Length{i}` is absent, negative or
///   not a number; `0.0` means "unknown, must be probed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDescriptor {
    /// 1-based ordinal from the playlist (`File{index}=`).
    pub index: u32,
    /// Track path relative to the source directory.
    pub filename: String,
    /// Chapter title.
    pub title: String,
    /// Declared length in seconds (playlist stores milliseconds).
    pub declared_length_secs: f64,
}

impl ChapterDescriptor {
    /// Create a descriptor, applying the default rules for title and length.
    pub fn new(
        index: u32,
        filename: impl Into<String>,
        title: Option<String>,
        length_ms: Option<f64>,
    ) -> Self {
        let filename = filename.into();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_filename(&filename));
        let declared_length_secs = length_ms
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0);

        Self {
            index,
            filename,
            title,
            declared_length_secs,
        }
    }

    /// Whether the length must be resolved with the probe.
    pub fn needs_probe(&self) -> bool {
        self.declared_length_secs <= 0.0
    }
}

/// Derive a chapter title from a track file name (base name, no extension).
pub fn title_from_filename(filename: &str) -> String {
    // Playlists written on Windows use backslashes.
    let normalized = filename.replace('\\', "/");
    Path::new(&normalized)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or(normalized)
}

/// Result of parsing a playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    /// Value of `NumberOfEntries`.
    pub declared_entries: u32,
    /// Entries in ordinal order; skipped ordinals are absent.
    pub chapters: Vec<ChapterDescriptor>,
    /// Non-fatal problems found while parsing.
    pub warnings: Vec<PlaylistWarning>,
    /// Name of the text encoding the playlist was decoded with.
    pub encoding: String,
}

impl Playlist {
    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Check if no entry could be parsed.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Non-fatal playlist problem. The affected entry is skipped or degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaylistWarning {
    /// `File{index}` is missing; the ordinal is skipped.
    MissingFile { index: u32 },
    /// Ordinals `from..=to` have no keys at all.
    MissingEntries { from: u32, to: u32 },
    /// `Title{index}` is missing; the title was derived from the file name.
    MissingTitle { index: u32, derived: String },
    /// `Length{index}` is missing; the length will be probed.
    MissingLength { index: u32, filename: String },
    /// `Length{index}` is not a number; the length will be probed.
    InvalidLength {
        index: u32,
        filename: String,
        value: String,
    },
}

impl fmt::Display for PlaylistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistWarning::MissingFile { index } => {
                write!(f, "Missing File{} entry in playlist", index)
            }
            PlaylistWarning::MissingEntries { from, to } => {
                write!(f, "No playlist entries for ordinals {}..={}", from, to)
            }
            PlaylistWarning::MissingTitle { index, derived } => {
                write!(f, "Missing Title{}, using '{}'", index, derived)
            }
            PlaylistWarning::MissingLength { index, filename } => {
                write!(f, "Missing Length{} for {}", index, filename)
            }
            PlaylistWarning::InvalidLength {
                index,
                filename,
                value,
            } => write!(
                f,
                "Invalid Length{} '{}' for {}",
                index, value, filename
            ),
        }
    }
}

/// Errors that make a playlist unusable.
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Failed to read playlist {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Playlist is not valid {encoding} text")]
    Encoding { encoding: String },

    #[error("Invalid playlist format: {0}")]
    Format(String),
}

impl PlaylistError {
    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

/// Result type for playlist operations.
pub type PlaylistResult<T> = Result<T, PlaylistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_converts_milliseconds() {
        let d = ChapterDescriptor::new(1, "a.mp3", Some("Intro".into()), Some(5000.0));
        assert_eq!(d.title, "Intro");
        assert!((d.declared_length_secs - 5.0).abs() < 1e-9);
        assert!(!d.needs_probe());
    }

    #[test]
    fn descriptor_defaults_title_and_length() {
        let d = ChapterDescriptor::new(2, "cd1/b.mp3", Some("  ".into()), None);
        assert_eq!(d.title, "b");
        assert_eq!(d.declared_length_secs, 0.0);
        assert!(d.needs_probe());
    }

    #[test]
    fn negative_length_is_unknown() {
        let d = ChapterDescriptor::new(1, "a.mp3", None, Some(-1.0));
        assert!(d.needs_probe());
    }

    #[test]
    fn title_handles_windows_separators() {
        assert_eq!(title_from_filename(r"disc1\03 - Ende.mp3"), "03 - Ende");
        assert_eq!(title_from_filename("noext"), "noext");
    }

    #[test]
    fn warning_display_names_the_key() {
        let w = PlaylistWarning::InvalidLength {
            index: 3,
            filename: "c.mp3".into(),
            value: "abc".into(),
        };
        assert_eq!(w.to_string(), "Invalid Length3 'abc' for c.mp3");
    }
}
