//! Playlist (`.pls`) parsing.
//!
//! Turns the playlist shipped next to the audio tracks into an ordered list
//! of [`ChapterDescriptor`]s:
//!
//! ```text
//! [playlist]
//! NumberOfEntries=2
//! File1=01.mp3
//! Title1=Intro
//! Length1=5000          <- milliseconds
//! File2=02.mp3
//! Length2=0             <- unknown, resolved later with ffprobe
//! ```
//!
//! Keys are looked up by ordinal, not by position, and the text encoding is
//! detected before decoding (publishers still ship windows-1250 playlists).
//!
//! # Usage
//!
//! ```ignore
//! use abm_core::playlist::parse_playlist;
//!
//! let playlist = parse_playlist(Path::new("/books/respekt/playlist.pls"))?;
//! for warning in &playlist.warnings {
//!     println!("{}", warning);
//! }
//! ```

mod encoding;
mod parser;
mod types;

pub use encoding::{decode_playlist_bytes, DecodedText};
pub use parser::{parse_playlist, parse_playlist_str};
pub use types::{ChapterDescriptor, Playlist, PlaylistError, PlaylistResult, PlaylistWarning};
