//! ffmpeg command options builder.
//!
//! Builds argument vectors for both transcoder passes. Audio is always
//! stream-copied; nothing is re-encoded.
//!
//! Stage B input layout:
//!
//! - input 0: Stage A intermediate (audio)
//! - input 1: ffmetadata document (global tags and chapters)
//! - input 2: cover image (optional)

use std::ffi::OsString;
use std::path::Path;

use crate::models::MergeMetadata;

/// Options every invocation starts with.
const COMMON_ARGS: [&str; 3] = ["-hide_banner", "-nostdin", "-y"];

fn common_args() -> Vec<OsString> {
    COMMON_ARGS.iter().map(OsString::from).collect()
}

/// Stage A arguments: concat demuxer, audio stream copy.
pub fn concat_args(list: &Path, output: &Path) -> Vec<OsString> {
    let mut args = common_args();
    args.extend(["-f", "concat", "-safe", "0", "-i"].map(OsString::from));
    args.push(list.as_os_str().to_os_string());
    args.extend(["-map", "0:a", "-c", "copy"].map(OsString::from));
    args.push(output.as_os_str().to_os_string());
    args
}

/// Check if a path names an mp3 file.
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case("mp3"))
}

/// Builder for the Stage B (chapters, tags, cover) command.
pub struct MuxOptionsBuilder<'a> {
    intermediate: &'a Path,
    metadata_doc: &'a Path,
    metadata: &'a MergeMetadata,
    output: &'a Path,
    cover: Option<&'a Path>,
    id3v2_version: u8,
}

impl<'a> MuxOptionsBuilder<'a> {
    /// Create a new options builder.
    pub fn new(
        intermediate: &'a Path,
        metadata_doc: &'a Path,
        metadata: &'a MergeMetadata,
        output: &'a Path,
    ) -> Self {
        Self {
            intermediate,
            metadata_doc,
            metadata,
            output,
            cover: None,
            id3v2_version: 0,
        }
    }

    /// Attach a cover image. The caller has already checked it exists.
    pub fn with_cover(mut self, cover: Option<&'a Path>) -> Self {
        self.cover = cover;
        self
    }

    /// ID3v2 version for mp3 output (0 leaves ffmpeg's default).
    pub fn with_id3v2_version(mut self, version: u8) -> Self {
        self.id3v2_version = version;
        self
    }

    /// Build the complete ffmpeg argument vector.
    pub fn build(&self) -> Vec<OsString> {
        let mut args = common_args();

        // Inputs
        push_pair(&mut args, "-i", self.intermediate.as_os_str());
        push_pair(&mut args, "-i", self.metadata_doc.as_os_str());
        if let Some(cover) = self.cover {
            push_pair(&mut args, "-i", cover.as_os_str());
        }

        // Stream selection
        push_pair(&mut args, "-map", "0:a");
        if self.cover.is_some() {
            push_pair(&mut args, "-map", "2:v");
        }
        push_pair(&mut args, "-map_metadata", "1");
        push_pair(&mut args, "-map_chapters", "1");
        push_pair(&mut args, "-c", "copy");

        if self.cover.is_some() {
            self.add_cover_options(&mut args);
        }

        if self.id3v2_version > 0 && is_mp3(self.output) {
            push_pair(&mut args, "-id3v2_version", &self.id3v2_version.to_string());
        }

        for (key, value) in self.metadata.tags() {
            push_pair(&mut args, "-metadata", &format!("{}={}", key, value));
        }

        args.push(self.output.as_os_str().to_os_string());
        args
    }

    /// Front-cover role tags for the attached picture.
    fn add_cover_options(&self, args: &mut Vec<OsString>) {
        push_pair(args, "-disposition:v:0", "attached_pic");
        push_pair(args, "-metadata:s:v", "title=Cover");
        push_pair(args, "-metadata:s:v", "comment=Cover (front)");
    }
}

fn push_pair(args: &mut Vec<OsString>, flag: &str, value: impl AsRef<std::ffi::OsStr>) {
    args.push(OsString::from(flag));
    args.push(value.as_ref().to_os_string());
}

/// Format arguments for pretty display (one option per line).
pub fn format_args_pretty(args: &[OsString]) -> String {
    let tokens: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    let mut result = String::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        if token.starts_with('-') && i + 1 < tokens.len() && !tokens[i + 1].starts_with('-') {
            // Option with value
            result.push_str(&format!("{} {} \\\n", token, tokens[i + 1]));
            i += 2;
        } else {
            result.push_str(&format!("{} \\\n", token));
            i += 1;
        }
    }

    result
}
