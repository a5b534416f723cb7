//! ffmpeg `ffmetadata` document writer.
//!
//! Layout:
//!
//! ```text
//! ;FFMETADATA1
//! title=Book
//! artist=Author
//!
//! [CHAPTER]
//! TIMEBASE=1/1000
//! START=0
//! END=5000
//! title=Intro
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::models::MergeMetadata;

use super::types::ResolvedChapter;

/// Format identifier on the first line of the document.
pub const FFMETADATA_HEADER: &str = ";FFMETADATA1";

/// Render the metadata document for the given tags and chapters.
pub fn render_ffmetadata(metadata: &MergeMetadata, chapters: &[ResolvedChapter]) -> String {
    let mut doc = String::new();
    doc.push_str(FFMETADATA_HEADER);
    doc.push('\n');

    let tags = metadata.tags();
    for (key, value) in &tags {
        let _ = writeln!(doc, "{}={}", key, escape_value(value));
    }
    if !tags.is_empty() {
        doc.push('\n');
    }

    for chapter in chapters {
        doc.push_str("[CHAPTER]\n");
        doc.push_str("TIMEBASE=1/1000\n");
        let _ = writeln!(doc, "START={}", chapter.start_ms);
        if let Some(end) = chapter.end_ms {
            let _ = writeln!(doc, "END={}", end);
        }
        let _ = writeln!(doc, "title={}", escape_value(chapter.title()));
        doc.push('\n');
    }

    doc
}

/// Render and write the metadata document to `path`.
pub fn write_ffmetadata(
    path: &Path,
    metadata: &MergeMetadata,
    chapters: &[ResolvedChapter],
) -> io::Result<()> {
    fs::write(path, render_ffmetadata(metadata, chapters))
}

/// Escape a value for the ffmetadata format.
///
/// `=`, `;`, `#`, `\` and newlines are prefixed with a backslash.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '=' | ';' | '#' | '\\' | '\n' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
