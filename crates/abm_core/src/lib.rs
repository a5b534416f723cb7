//! ABM Core - Backend logic for audiobook-merge
//!
//! Merges a directory of audio tracks, described by a `.pls` playlist,
//! into one audio file with embedded chapter markers, tags and an
//! optional cover picture. All media work is delegated to ffmpeg and
//! ffprobe; this crate plans and drives it.
//!
//! - [`playlist`] parses the playlist into chapter descriptors
//! - [`probe`] resolves track durations the playlist omits
//! - [`chapters`] builds the chapter timeline and the ffmetadata document
//! - [`mux`] plans the concat list and the mux command line
//! - [`orchestrator`] runs the two ffmpeg stages as a step pipeline

pub mod chapters;
pub mod config;
pub mod logging;
pub mod models;
pub mod mux;
pub mod orchestrator;
pub mod playlist;
pub mod probe;
pub mod tools;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
