//! Chapter timeline and chapter metadata document.
//!
//! Folds the parsed playlist into cumulative chapter boundaries and
//! serializes them in ffmpeg's `ffmetadata` format for the mux stage.
//!
//! # Timeline rules
//!
//! - Entries whose file is missing from the source directory are dropped
//!   and do not consume a timeline slot.
//! - A chapter with a known duration gets an end time and advances the clock.
//! - A chapter with an unknown duration starts at the current clock, has no
//!   end, and leaves the clock unchanged.
//!
//! # Usage
//!
//! ```ignore
//! use abm_core::chapters::{build_timeline, render_ffmetadata};
//!
//! let timeline = build_timeline(&playlist.chapters, source_dir, &resolver);
//! let document = render_ffmetadata(&metadata, &timeline.chapters);
//! ```

mod ffmetadata;
mod timeline;
mod types;

pub use ffmetadata::{escape_value, render_ffmetadata, write_ffmetadata, FFMETADATA_HEADER};
pub use timeline::{build_timeline, pending_probes};
pub use types::{format_timestamp, secs_to_ms, ResolvedChapter, SkippedChapter, Timeline};
