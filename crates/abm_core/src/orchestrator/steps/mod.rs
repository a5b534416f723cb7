//! Pipeline step implementations.
//!
//! Each step handles a specific phase of the merge pipeline.

mod chapters;
mod concat;
mod metadata;
mod mux;
mod transcode;
mod validate;

pub use chapters::ChaptersStep;
pub use concat::ConcatStep;
pub use metadata::MetadataStep;
pub use mux::MuxStep;
pub use validate::ValidateStep;
