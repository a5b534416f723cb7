//! Text encoding detection for playlist files.
//!
//! Order of attempts: byte order mark, strict UTF-8, then a statistical
//! guess with `chardetng`. Decoding under the chosen encoding is strict:
//! malformed input is an error, never replacement characters.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use super::types::{PlaylistError, PlaylistResult};

/// Decoded playlist text together with the encoding that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Detect the encoding of `bytes` and decode them.
pub fn decode_playlist_bytes(bytes: &[u8]) -> PlaylistResult<DecodedText> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        tracing::debug!("Playlist has a {} byte order mark", encoding.name());
        return decode_strict(encoding, &bytes[bom_len..]);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, false);
    tracing::debug!("Playlist is not UTF-8, detected {}", encoding.name());

    decode_strict(encoding, bytes)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> PlaylistResult<DecodedText> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
        })
        .ok_or_else(|| PlaylistError::Encoding {
            encoding: encoding.name().to_string(),
        })
}
