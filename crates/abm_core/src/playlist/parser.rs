//! Single-pass `.pls` parser.
//!
//! The text is indexed once by ordinal and key, then resolved into the
//! ordered descriptor sequence for ordinals `1..=NumberOfEntries`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::encoding::decode_playlist_bytes;
use super::types::{
    title_from_filename, ChapterDescriptor, Playlist, PlaylistError, PlaylistResult,
    PlaylistWarning,
};

/// Read, decode and parse a playlist file.
pub fn parse_playlist(path: &Path) -> PlaylistResult<Playlist> {
    let bytes = fs::read(path).map_err(|source| PlaylistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode_playlist_bytes(&bytes)?;
    let mut playlist = parse_playlist_str(&decoded.text)?;
    playlist.encoding = decoded.encoding.to_string();

    tracing::debug!(
        "Parsed {} of {} playlist entries from {} ({})",
        playlist.len(),
        playlist.declared_entries,
        path.display(),
        playlist.encoding
    );

    Ok(playlist)
}

/// Parse already decoded playlist text.
pub fn parse_playlist_str(text: &str) -> PlaylistResult<Playlist> {
    let index = PlaylistIndex::build(text);

    let raw_count = index
        .entry_count
        .ok_or_else(|| PlaylistError::format("missing entry count"))?;
    let declared_entries: u32 = raw_count
        .parse()
        .map_err(|_| PlaylistError::format(format!("invalid entry count '{}'", raw_count)))?;

    let mut playlist = Playlist {
        declared_entries,
        encoding: "UTF-8".to_string(),
        ..Default::default()
    };

    // Only ordinals that carry keys are visited; runs of ordinals without
    // any key are reported as one range each.
    let indexed = if declared_entries == 0 {
        None
    } else {
        Some(index.entries.range(1..=declared_entries))
    };

    let mut next_expected: u64 = 1;
    for (&ordinal, raw) in indexed.into_iter().flatten() {
        if u64::from(ordinal) > next_expected {
            playlist.warnings.push(PlaylistWarning::MissingEntries {
                from: next_expected as u32,
                to: ordinal - 1,
            });
        }
        next_expected = u64::from(ordinal) + 1;

        let Some(filename) = raw.file else {
            playlist
                .warnings
                .push(PlaylistWarning::MissingFile { index: ordinal });
            continue;
        };

        let title = match raw.title {
            Some(title) => Some(title.to_string()),
            None => {
                playlist.warnings.push(PlaylistWarning::MissingTitle {
                    index: ordinal,
                    derived: title_from_filename(filename),
                });
                None
            }
        };

        let length_ms = match raw.length {
            None => {
                playlist.warnings.push(PlaylistWarning::MissingLength {
                    index: ordinal,
                    filename: filename.to_string(),
                });
                None
            }
            Some(value) => match value.parse::<f64>() {
                Ok(ms) if ms.is_finite() => Some(ms),
                _ => {
                    playlist.warnings.push(PlaylistWarning::InvalidLength {
                        index: ordinal,
                        filename: filename.to_string(),
                        value: value.to_string(),
                    });
                    None
                }
            },
        };

        playlist
            .chapters
            .push(ChapterDescriptor::new(ordinal, filename, title, length_ms));
    }

    if next_expected <= u64::from(declared_entries) {
        playlist.warnings.push(PlaylistWarning::MissingEntries {
            from: next_expected as u32,
            to: declared_entries,
        });
    }

    Ok(playlist)
}

/// Keys of one ordinal. Blank values are stored as absent.
#[derive(Debug, Default)]
struct RawEntry<'a> {
    file: Option<&'a str>,
    title: Option<&'a str>,
    length: Option<&'a str>,
}

#[derive(Debug, Default)]
struct PlaylistIndex<'a> {
    entry_count: Option<&'a str>,
    entries: BTreeMap<u32, RawEntry<'a>>,
}

#[derive(Debug, Clone, Copy)]
enum EntryKey {
    File,
    Title,
    Length,
}

impl<'a> PlaylistIndex<'a> {
    fn build(text: &'a str) -> Self {
        let mut index = Self::default();

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.eq_ignore_ascii_case("NumberOfEntries") {
                index.entry_count.get_or_insert(value);
                continue;
            }

            let Some((kind, ordinal)) = split_entry_key(key) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            // First occurrence of a key wins.
            let entry = index.entries.entry(ordinal).or_default();
            let slot = match kind {
                EntryKey::File => &mut entry.file,
                EntryKey::Title => &mut entry.title,
                EntryKey::Length => &mut entry.length,
            };
            slot.get_or_insert(value);
        }

        index
    }
}

/// Split `File12` into (`File`, 12). Case-insensitive.
fn split_entry_key(key: &str) -> Option<(EntryKey, u32)> {
    let lower = key.to_ascii_lowercase();
    let (kind, digits) = if let Some(rest) = lower.strip_prefix("file") {
        (EntryKey::File, rest)
    } else if let Some(rest) = lower.strip_prefix("title") {
        (EntryKey::Title, rest)
    } else if let Some(rest) = lower.strip_prefix("length") {
        (EntryKey::Length, rest)
    } else {
        return None;
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|ordinal| (kind, ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "[playlist]\r\n\
        NumberOfEntries=2\r\n\
        File1=a.mp3\r\n\
        Title1=Intro\r\n\
        Length1=5000\r\n\
        File2=b.mp3\r\n\
        Length2=0\r\n\
        Version=2\r\n";

    #[test]
    fn parses_basic_playlist() {
        let playlist = parse_playlist_str(BASIC).unwrap();
        assert_eq!(playlist.declared_entries, 2);
        assert_eq!(playlist.len(), 2);

        let first = &playlist.chapters[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.filename, "a.mp3");
        assert_eq!(first.title, "Intro");
        assert!((first.declared_length_secs - 5.0).abs() < 1e-9);

        let second = &playlist.chapters[1];
        assert_eq!(second.title, "b");
        assert!(second.needs_probe());
        assert!(playlist
            .warnings
            .contains(&PlaylistWarning::MissingTitle {
                index: 2,
                derived: "b".into()
            }));
    }

    #[test]
    fn keys_are_order_independent() {
        let text = "Length2=2000\nFile2=two.mp3\nTitle1=One\nNumberOfEntries=2\nFile1=one.mp3\nTitle2=Two\nLength1=1000\n";
        let playlist = parse_playlist_str(text).unwrap();
        let titles: Vec<_> = playlist.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn file10_is_not_confused_with_file1() {
        let mut text = String::from("NumberOfEntries=10\n");
        for i in (1..=10).rev() {
            text.push_str(&format!("File{i}=track{i:02}.mp3\nLength{i}=1000\n"));
        }
        let playlist = parse_playlist_str(&text).unwrap();
        assert_eq!(playlist.len(), 10);
        assert_eq!(playlist.chapters[0].filename, "track01.mp3");
        assert_eq!(playlist.chapters[9].filename, "track10.mp3");
    }

    #[test]
    fn missing_entry_count_is_format_error() {
        let err = parse_playlist_str("File1=a.mp3\n").unwrap_err();
        assert!(matches!(err, PlaylistError::Format(ref m) if m == "missing entry count"));
    }

    #[test]
    fn non_numeric_entry_count_is_format_error() {
        let err = parse_playlist_str("NumberOfEntries=many\n").unwrap_err();
        assert!(matches!(err, PlaylistError::Format(_)));
    }

    #[test]
    fn missing_file_skips_ordinal() {
        let text = "NumberOfEntries=3\nFile1=a.mp3\nTitle2=Orphan\nFile3=c.mp3\n";
        let playlist = parse_playlist_str(text).unwrap();
        let ordinals: Vec<_> = playlist.chapters.iter().map(|c| c.index).collect();
        assert_eq!(ordinals, vec![1, 3]);
        assert!(playlist
            .warnings
            .contains(&PlaylistWarning::MissingFile { index: 2 }));
    }

    #[test]
    fn non_numeric_length_degrades_to_unknown() {
        let text = "NumberOfEntries=1\nFile1=a.mp3\nTitle1=A\nLength1=12:30\n";
        let playlist = parse_playlist_str(text).unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.chapters[0].declared_length_secs, 0.0);
        assert!(playlist.warnings.iter().any(|w| matches!(
            w,
            PlaylistWarning::InvalidLength { index: 1, value, .. } if value == "12:30"
        )));
    }

    #[test]
    fn zero_entries_parse_to_empty_playlist() {
        let playlist = parse_playlist_str("NumberOfEntries=0\nFile1=a.mp3\n").unwrap();
        assert!(playlist.is_empty());
        assert!(playlist.warnings.is_empty());
    }

    #[test]
    fn entries_beyond_count_are_ignored() {
        let text = "NumberOfEntries=1\nFile1=a.mp3\nFile2=b.mp3\n";
        let playlist = parse_playlist_str(text).unwrap();
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn trailing_missing_ordinals_are_one_warning() {
        let text = "NumberOfEntries=1000\nFile1=a.mp3\nLength1=1000\nTitle1=A\n";
        let playlist = parse_playlist_str(text).unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(
            playlist.warnings,
            vec![PlaylistWarning::MissingEntries { from: 2, to: 1000 }]
        );
    }

    #[test]
    fn interior_gaps_are_one_warning_each() {
        let text = "NumberOfEntries=4000000000\nFile1=a.mp3\nLength1=1000\nTitle1=A\n\
                    File3999999999=b.mp3\nLength3999999999=1000\nTitle3999999999=B\n";
        let playlist = parse_playlist_str(text).unwrap();
        let ordinals: Vec<_> = playlist.chapters.iter().map(|c| c.index).collect();
        assert_eq!(ordinals, vec![1, 3_999_999_999]);
        assert_eq!(
            playlist.warnings,
            vec![
                PlaylistWarning::MissingEntries {
                    from: 2,
                    to: 3_999_999_998
                },
                PlaylistWarning::MissingEntries {
                    from: 4_000_000_000,
                    to: 4_000_000_000
                },
            ]
        );
    }

    #[test]
    fn last_possible_ordinal_is_parsed() {
        let text = "NumberOfEntries=4294967295\nFile4294967295=z.mp3\n";
        let playlist = parse_playlist_str(text).unwrap();
        assert_eq!(playlist.chapters[0].index, u32::MAX);
        assert!(playlist.warnings.contains(&PlaylistWarning::MissingEntries {
            from: 1,
            to: u32::MAX - 1
        }));
    }

    #[test]
    fn keys_are_case_insensitive_and_first_wins() {
        let text = "numberofentries=1\nfile1=a.mp3\nFILE1=b.mp3\ntitle1=A=B\nlength1=1500\n";
        let playlist = parse_playlist_str(text).unwrap();
        assert_eq!(playlist.chapters[0].filename, "a.mp3");
        assert_eq!(playlist.chapters[0].title, "A=B");
        assert!((playlist.chapters[0].declared_length_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn parse_playlist_reads_legacy_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.pls");
        std::fs::write(
            &path,
            b"[playlist]\r\nNumberOfEntries=1\r\nFile1=01.mp3\r\nTitle1=Kapitola \xE8\xEDslo jedna\r\nLength1=1000\r\n",
        )
        .unwrap();

        let playlist = parse_playlist(&path).unwrap();
        assert_ne!(playlist.encoding, "UTF-8");
        assert_eq!(playlist.len(), 1);
        assert!(playlist.chapters[0].title.starts_with("Kapitola "));
    }

    #[test]
    fn parse_playlist_reports_missing_file() {
        let err = parse_playlist(Path::new("/nonexistent/playlist.pls")).unwrap_err();
        assert!(matches!(err, PlaylistError::Io { .. }));
    }
}
