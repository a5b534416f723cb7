//! Chapters step - parses the playlist and builds the chapter timeline.
//!
//! Durations missing from the playlist are probed up front on a bounded
//! pool, then the timeline is folded sequentially from the cached results.

use crate::chapters::{build_timeline, format_timestamp, pending_probes};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{ChaptersOutput, Context, JobState};
use crate::playlist::parse_playlist;
use crate::probe::ProbeCache;

/// Builds the chapter timeline from the playlist.
pub struct ChaptersStep;

impl ChaptersStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChaptersStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ChaptersStep {
    fn name(&self) -> &str {
        "Chapters"
    }

    fn description(&self) -> &str {
        "Parse playlist and resolve chapter boundaries"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<()> {
        let inputs = state
            .validated
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Inputs have not been validated"))?;

        let playlist = parse_playlist(&inputs.playlist)?;
        ctx.logger.info(&format!(
            "Playlist declares {} entries ({} usable, {})",
            playlist.declared_entries,
            playlist.len(),
            playlist.encoding
        ));
        for warning in &playlist.warnings {
            ctx.logger.warn(&warning.to_string());
        }

        let pending = pending_probes(&playlist.chapters, &inputs.source_dir);
        let cache = if pending.is_empty() {
            ProbeCache::default()
        } else {
            ctx.logger.info(&format!(
                "Probing {} track(s) without a declared length",
                pending.len()
            ));
            ProbeCache::resolve_all(
                &pending,
                ctx.resolver.as_ref(),
                ctx.settings.probe.concurrency(),
            )
        };

        let timeline = build_timeline(&playlist.chapters, &inputs.source_dir, &cache);

        for skipped in &timeline.skipped {
            ctx.logger.warn(&format!(
                "File{} not found, chapter skipped: {}",
                skipped.index,
                skipped.path.display()
            ));
        }
        for chapter in timeline.chapters.iter().filter(|c| c.is_open_ended()) {
            ctx.logger.warn(&format!(
                "Duration of '{}' unknown, chapter '{}' has no end",
                chapter.descriptor.filename,
                chapter.title()
            ));
        }

        if timeline.is_empty() {
            return Err(StepError::NoChapters {
                declared: playlist.declared_entries,
            });
        }

        for chapter in &timeline.chapters {
            ctx.logger.debug(&format!(
                "{:>3}. {} [{} - {}]",
                chapter.descriptor.index,
                chapter.title(),
                format_timestamp(chapter.start_ms),
                chapter
                    .end_ms
                    .map(format_timestamp)
                    .unwrap_or_else(|| "open".to_string())
            ));
        }
        ctx.logger.info(&format!(
            "{} chapter(s) resolved, total {}",
            timeline.len(),
            format_timestamp(timeline.total_ms())
        ));

        state.chapters = Some(ChaptersOutput {
            declared_entries: playlist.declared_entries,
            encoding: playlist.encoding,
            probed: cache.len(),
            timeline,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.timeline() {
            Some(timeline) if !timeline.is_empty() => Ok(()),
            Some(_) => Err(StepError::invalid_output("Timeline is empty")),
            None => Err(StepError::invalid_output("Chapter results not recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::types::{test_context, ValidatedInputs};
    use std::fs;

    fn validated(ctx: &Context, dir: &std::path::Path, playlist: &str, files: &[&str]) -> JobState {
        let book = dir.join("book");
        fs::create_dir_all(&book).unwrap();
        fs::write(book.join("playlist.pls"), playlist).unwrap();
        for name in files {
            fs::write(book.join(name), b"audio").unwrap();
        }
        let mut state = JobState::new("job");
        state.validated = Some(ValidatedInputs {
            source_dir: book.clone(),
            playlist: book.join("playlist.pls"),
            output_path: ctx.output_path(),
        });
        state
    }

    #[test]
    fn resolves_declared_and_probed_lengths() {
        let (ctx, dir) = test_context();
        let mut state = validated(
            &ctx,
            dir.path(),
            "[playlist]\nNumberOfEntries=2\nFile1=a.mp3\nTitle1=Intro\nLength1=5000\nFile2=b.mp3\nLength2=0\n",
            &["a.mp3", "b.mp3"],
        );

        ChaptersStep::new().execute(&ctx, &mut state).unwrap();

        let output = state.chapters.as_ref().unwrap();
        assert_eq!(output.probed, 1);
        let bounds: Vec<_> = output
            .timeline
            .chapters
            .iter()
            .map(|c| (c.title().to_string(), c.start_ms, c.end_ms))
            .collect();
        // test_context's resolver reports 1.0 s for every file
        assert_eq!(
            bounds,
            vec![
                ("Intro".to_string(), 0, Some(5000)),
                ("b".to_string(), 5000, Some(6000)),
            ]
        );
        ChaptersStep::new().validate_output(&ctx, &state).unwrap();
    }

    #[test]
    fn no_existing_files_is_fatal() {
        let (ctx, dir) = test_context();
        let mut state = validated(
            &ctx,
            dir.path(),
            "NumberOfEntries=2\nFile1=a.mp3\nFile2=b.mp3\n",
            &[],
        );

        let err = ChaptersStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::NoChapters { declared: 2 }));
    }

    #[test]
    fn malformed_playlist_is_format_error() {
        let (ctx, dir) = test_context();
        let mut state = validated(&ctx, dir.path(), "File1=a.mp3\n", &["a.mp3"]);

        let err = ChaptersStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Playlist(_)));
    }

    #[test]
    fn requires_validated_inputs() {
        let (ctx, _dir) = test_context();
        let mut state = JobState::new("job");
        let err = ChaptersStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::PreconditionFailed(_)));
    }
}
