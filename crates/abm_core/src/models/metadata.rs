//! Descriptive metadata for the merged file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Book-level tags and cover image.
///
/// Every field is optional. Blank values count as absent and are never
/// written, neither into the chapter document nor as container tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Free-text description, written as the `comment` tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cover image to attach as the front cover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<PathBuf>,
}

impl MergeMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cover(mut self, cover: impl Into<PathBuf>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Present tags as `(key, value)` in document order:
    /// title, artist, album, date, comment.
    pub fn tags(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
            ("date", &self.date),
            ("comment", &self.description),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    /// Check if at least one tag would be written.
    pub fn has_tags(&self) -> bool {
        !self.tags().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_keep_fixed_order() {
        let metadata = MergeMetadata::new()
            .with_description("desc")
            .with_date("2020")
            .with_title("T");
        assert_eq!(
            metadata.tags(),
            vec![("title", "T"), ("date", "2020"), ("comment", "desc")]
        );
    }

    #[test]
    fn blank_values_are_absent() {
        let metadata = MergeMetadata::new().with_artist("   ").with_album("");
        assert!(metadata.tags().is_empty());
        assert!(!metadata.has_tags());
    }

    #[test]
    fn values_are_trimmed() {
        let metadata = MergeMetadata::new().with_artist("  Author \n");
        assert_eq!(metadata.tags(), vec![("artist", "Author")]);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_string(&MergeMetadata::new().with_title("T")).unwrap();
        assert_eq!(json, r#"{"title":"T"}"#);
    }
}
