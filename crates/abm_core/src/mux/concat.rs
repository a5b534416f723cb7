//! Concat-demuxer list planning.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chapters::ResolvedChapter;

/// Ordered track files for lossless concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatPlan {
    /// Track files in timeline order.
    pub entries: Vec<PathBuf>,
}

impl ConcatPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File name for the Stage A output, reusing the first track's extension.
    pub fn intermediate_name(&self) -> String {
        let extension = self
            .entries
            .first()
            .and_then(|p| p.extension())
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp3".to_string());
        format!("concat.{}", extension)
    }

    /// Render the list in concat-demuxer syntax, one `file '<path>'` per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file {}\n", quote_path(p)))
            .collect()
    }

    /// Write the rendered list to `path`.
    pub fn write_list(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

/// Project the timeline onto its track files.
pub fn plan_concat(chapters: &[ResolvedChapter]) -> ConcatPlan {
    ConcatPlan {
        entries: chapters.iter().map(|c| c.path.clone()).collect(),
    }
}

/// Single-quote a path for the concat list (`'` becomes `'\''`).
pub fn quote_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Move a finished file from scratch to its final location.
///
/// A plain rename is tried first. When that fails (e.g. scratch lives on
/// another filesystem) the file is copied to a hidden sibling of the target
/// and renamed from there, so the target path never holds a partial file.
pub fn publish_output(staged: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(staged, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::debug!(
                "rename {} -> {} failed ({}), copying",
                staged.display(),
                target.display(),
                e
            );
            let partial = partial_path(target);
            let result = fs::copy(staged, &partial)
                .and_then(|_| File::open(&partial)?.sync_all())
                .and_then(|_| fs::rename(&partial, target));
            if result.is_err() {
                let _ = fs::remove_file(&partial);
            }
            result
        }
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!(".{}.partial", name))
}
