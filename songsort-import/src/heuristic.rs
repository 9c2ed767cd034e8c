//! Metadata guessed from a file path
//!
//! Used when a file carries no usable tags. Assumes the common
//! `.../Artist/Album/NN - Title.ext` layout:
//! - title: file name without extension and without a leading track number
//! - album: parent directory, artist: grandparent directory, when both exist
//!
//! Pure string work, no file system access.

use songsort_core::Song;
use std::path::{Component, Path};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Metadata derived from a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMetadata {
    pub artist: String,
    pub album: String,
    pub title: String,
    /// Track number parsed from a leading "NN - " prefix
    pub track_number: Option<u32>,
}

/// Guess metadata from the layout of `path`
pub fn metadata_from_path(path: &Path) -> PathMetadata {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (track_number, title) = split_track_prefix(&stem);

    let directories: Vec<String> = path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let (artist, album) = match directories.as_slice() {
        [.., artist, album] => (artist.clone(), album.clone()),
        _ => (UNKNOWN_ARTIST.to_string(), UNKNOWN_ALBUM.to_string()),
    };

    PathMetadata {
        artist,
        album,
        title: title.to_string(),
        track_number,
    }
}

/// Build an unranked song entirely from its path
pub fn song_from_path(path: &Path) -> Song {
    let meta = metadata_from_path(path);
    Song::new(
        path,
        meta.artist,
        meta.album,
        meta.track_number.unwrap_or(0),
        meta.title,
    )
}

/// Split "03 - Title" into (Some(3), "Title")
///
/// Up to three leading digits followed by at least one separator (space, `-`,
/// `.`, `_`) count as a track number. Names that would be left empty keep
/// their digits as the title.
fn split_track_prefix(stem: &str) -> (Option<u32>, &str) {
    let digits_end = stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len());
    if digits_end == 0 || digits_end > 3 {
        return (None, stem);
    }

    let rest = &stem[digits_end..];
    let title = rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '.' | '_'));
    if title.len() == rest.len() || title.is_empty() {
        return (None, stem);
    }

    (stem[..digits_end].parse().ok(), title)
}
