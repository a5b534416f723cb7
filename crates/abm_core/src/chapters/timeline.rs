//! Timeline fold over the playlist.

use std::path::{Path, PathBuf};

use crate::playlist::ChapterDescriptor;
use crate::probe::DurationResolver;

use super::types::{format_timestamp, secs_to_ms, ResolvedChapter, SkippedChapter, Timeline};

/// Existing track files whose length must come from the probe.
///
/// Entries with a declared length and entries whose file is missing are
/// left out, so the probe never runs for them.
pub fn pending_probes(descriptors: &[ChapterDescriptor], source_dir: &Path) -> Vec<PathBuf> {
    descriptors
        .iter()
        .filter(|d| d.needs_probe())
        .map(|d| source_dir.join(&d.filename))
        .filter(|p| p.is_file())
        .collect()
}

/// Fold descriptors into chapter boundaries.
///
/// The resolver is only consulted for existing files without a declared
/// length. An empty result means no backing file exists; callers treat
/// that as fatal.
pub fn build_timeline(
    descriptors: &[ChapterDescriptor],
    source_dir: &Path,
    resolver: &dyn DurationResolver,
) -> Timeline {
    let mut timeline = Timeline::default();
    let mut clock_ms: u64 = 0;

    for descriptor in descriptors {
        let path = source_dir.join(&descriptor.filename);
        if !path.is_file() {
            tracing::debug!(
                "File{} '{}' not found, skipping chapter",
                descriptor.index,
                path.display()
            );
            timeline.skipped.push(SkippedChapter {
                index: descriptor.index,
                path,
            });
            continue;
        }

        let duration_secs = if descriptor.needs_probe() {
            match resolver.resolve(&path) {
                Some(secs) => secs,
                None => {
                    tracing::debug!(
                        "Duration of '{}' unknown, chapter '{}' has no end",
                        descriptor.filename,
                        descriptor.title
                    );
                    0.0
                }
            }
        } else {
            descriptor.declared_length_secs
        };

        let start_ms = clock_ms;
        let end_ms = match secs_to_ms(duration_secs) {
            0 => None,
            length_ms => Some(start_ms.saturating_add(length_ms)),
        };
        if let Some(end) = end_ms {
            clock_ms = end;
        }

        tracing::debug!(
            "Chapter {} '{}': {} -> {}",
            descriptor.index,
            descriptor.title,
            format_timestamp(start_ms),
            end_ms.map(format_timestamp).unwrap_or_else(|| "open".to_string())
        );

        timeline.chapters.push(ResolvedChapter {
            descriptor: descriptor.clone(),
            path,
            duration_secs,
            start_ms,
            end_ms,
        });
    }

    timeline
}
