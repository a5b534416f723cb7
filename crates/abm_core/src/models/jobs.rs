//! Job-related data structures (merge job, merge result).

use std::fs;
use std::path::{self, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::{ErrorKind, JobStatus, MergeStage};
use super::metadata::MergeMetadata;

/// Playlist file looked up in the source directory when a job names none.
pub const DEFAULT_PLAYLIST_NAME: &str = "playlist.pls";

/// One merge invocation: a source directory of tracks plus its playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeJob {
    /// Job name used for log files and reporting.
    pub name: String,
    /// Directory holding the track files.
    pub source_dir: PathBuf,
    /// Playlist path (defaults to `<source_dir>/playlist.pls`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<PathBuf>,
    /// Output path (derived from the source directory when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Tags and cover for the merged file.
    #[serde(default)]
    pub metadata: MergeMetadata,
}

impl MergeJob {
    /// Create a job for a source directory, named after the directory.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            name: dir_basename(&resolve_dir(&source_dir)),
            source_dir,
            playlist: None,
            output: None,
            metadata: MergeMetadata::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_playlist(mut self, playlist: impl Into<PathBuf>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_metadata(mut self, metadata: MergeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Playlist to parse.
    pub fn playlist_path(&self) -> PathBuf {
        self.playlist
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_PLAYLIST_NAME))
    }

    /// Final output path, deriving one with `extension` if none was given.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derived_output_path(&resolve_dir(&self.source_dir), extension))
    }
}

/// Absolute form of a directory: canonical when it exists, otherwise
/// joined onto the working directory.
pub fn resolve_dir(dir: &Path) -> PathBuf {
    fs::canonicalize(dir)
        .or_else(|_| path::absolute(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

/// `<source-dir-basename>_merged.<ext>` next to the source directory.
///
/// `source_dir` is used as given; pass it through [`resolve_dir`] first so
/// `.` and `..` components do not leak into the name.
pub fn derived_output_path(source_dir: &Path, extension: &str) -> PathBuf {
    let parent = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let extension = extension.trim_start_matches('.');
    parent.join(format!("{}_merged.{}", dir_basename(source_dir), extension))
}

fn dir_basename(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audiobook".to_string())
}

/// Terminal outcome of a merge job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Final status.
    pub status: JobStatus,
    /// Job name.
    pub name: String,
    /// Path of the merged file (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Number of chapters written into the merged file.
    pub chapter_count: usize,
    /// Stage that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<MergeStage>,
    /// Failure category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeResult {
    /// Create a successful merge result.
    pub fn merged(name: impl Into<String>, output: PathBuf, chapter_count: usize) -> Self {
        Self {
            status: JobStatus::Merged,
            name: name.into(),
            output: Some(output),
            chapter_count,
            failed_stage: None,
            error_kind: None,
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failed(
        name: impl Into<String>,
        stage: Option<MergeStage>,
        kind: ErrorKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: JobStatus::Failed,
            name: name.into(),
            output: None,
            chapter_count: 0,
            failed_stage: stage,
            error_kind: Some(kind),
            error: Some(error.into()),
        }
    }

    /// Check if the merge produced its output.
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_defaults_to_source_dir() {
        let job = MergeJob::new("/books/Solaris");
        assert_eq!(job.name, "Solaris");
        assert_eq!(job.playlist_path(), PathBuf::from("/books/Solaris/playlist.pls"));

        let job = job.with_playlist("/tmp/list.pls");
        assert_eq!(job.playlist_path(), PathBuf::from("/tmp/list.pls"));
    }

    #[test]
    fn output_is_derived_next_to_source() {
        let job = MergeJob::new("/books/Solaris/");
        assert_eq!(
            job.output_path("mp3"),
            PathBuf::from("/books/Solaris_merged.mp3")
        );
        assert_eq!(
            derived_output_path(Path::new("Solaris"), ".m4b"),
            PathBuf::from("./Solaris_merged.m4b")
        );
    }

    #[test]
    fn current_dir_is_named_after_its_real_path() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let basename = cwd.file_name().unwrap().to_string_lossy().into_owned();

        let job = MergeJob::new(".");
        assert_eq!(job.name, basename);
        assert_eq!(
            job.output_path("mp3"),
            cwd.parent().unwrap().join(format!("{}_merged.mp3", basename))
        );
    }

    #[test]
    fn parent_components_are_resolved() {
        let root = tempfile::tempdir().unwrap();
        let shelf = root.path().join("shelf");
        std::fs::create_dir_all(shelf.join("book")).unwrap();
        let real_root = root.path().canonicalize().unwrap();

        let job = MergeJob::new(shelf.join("book").join(".."));
        assert_eq!(job.name, "shelf");
        assert_eq!(job.output_path("mp3"), real_root.join("shelf_merged.mp3"));
    }

    #[test]
    fn explicit_output_wins() {
        let job = MergeJob::new("/books/Solaris").with_output("/out/book.mp3");
        assert_eq!(job.output_path("mp3"), PathBuf::from("/out/book.mp3"));
    }

    #[test]
    fn failed_result_serializes_stage() {
        let result = MergeResult::failed(
            "Solaris",
            Some(MergeStage::Concat),
            ErrorKind::Concat,
            "ffmpeg exited with 1",
        );
        assert!(!result.is_success());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"Failed\""));
        assert!(json.contains("\"failed_stage\":\"concat\""));
        assert!(json.contains("\"error_kind\":\"concat\""));
        assert!(!json.contains("\"output\""));
    }

    #[test]
    fn merged_result_reports_chapters() {
        let result = MergeResult::merged("Solaris", PathBuf::from("/o.mp3"), 12);
        assert!(result.is_success());
        assert_eq!(result.chapter_count, 12);
    }
}
