//! Transcoder planning for the two ffmpeg passes.
//!
//! # Architecture
//!
//! - **concat**: Builds the ordered concat-demuxer list (Stage A) and moves
//!   the finished file into place
//! - **options_builder**: Converts plans into ffmpeg argument vectors for
//!   Stage A (concat) and Stage B (chapters, tags, cover)

mod concat;
mod options_builder;

pub use concat::{plan_concat, publish_output, quote_path, ConcatPlan};
pub use options_builder::{concat_args, format_args_pretty, is_mp3, MuxOptionsBuilder};
