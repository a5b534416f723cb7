//! Track duration resolution.
//!
//! Chapters whose playlist length is unknown get their duration from
//! ffprobe. A failed probe is never fatal: the duration is reported as
//! unknown (`None`) and the chapter becomes an open-ended marker.

mod batch;
mod duration;

pub use batch::ProbeCache;
pub use duration::{parse_duration_output, DurationResolver, FfprobeResolver};
