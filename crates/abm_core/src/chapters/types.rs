//! Resolved chapter types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::playlist::ChapterDescriptor;

/// A chapter placed on the merged timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedChapter {
    /// The playlist entry this chapter came from.
    pub descriptor: ChapterDescriptor,
    /// Absolute path of the backing track file.
    pub path: PathBuf,
    /// Resolved duration in seconds (0 = unknown).
    pub duration_secs: f64,
    /// Chapter start on the merged timeline, in milliseconds.
    pub start_ms: u64,
    /// Chapter end in milliseconds, present only for a known duration.
    pub end_ms: Option<u64>,
}

impl ResolvedChapter {
    /// Chapter title.
    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    /// Whether this chapter is an open-ended marker.
    pub fn is_open_ended(&self) -> bool {
        self.end_ms.is_none()
    }
}

/// A playlist entry left out of the timeline because its file is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedChapter {
    /// Playlist ordinal.
    pub index: u32,
    /// Path that was looked up.
    pub path: PathBuf,
}

/// Result of folding a playlist into chapter boundaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// Chapters in playlist order.
    pub chapters: Vec<ResolvedChapter>,
    /// Entries dropped because their file does not exist.
    pub skipped: Vec<SkippedChapter>,
}

impl Timeline {
    /// Number of chapters that made it onto the timeline.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Check if no chapter survived.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Number of open-ended chapters.
    pub fn open_ended_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.is_open_ended()).count()
    }

    /// End of the last bounded chapter, in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.chapters
            .iter()
            .filter_map(|c| c.end_ms)
            .max()
            .unwrap_or(0)
    }
}

/// Convert seconds to whole milliseconds.
///
/// Non-finite and non-positive inputs give 0.
pub fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

/// Format milliseconds as `HH:MM:SS.mmm` for log output.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
