//! Song record
//!
//! A song is identified by its file path and carries free-text metadata plus a
//! rank slot. The rank stays [`Rank::UNRANKED`] until a comparison session over
//! the owning list completes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle to a song inside the [`SongList`](crate::SongList) that assigned it
///
/// Handles are only meaningful for the list that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub(crate) u64);

impl SongId {
    /// Raw handle value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "song#{}", self.0)
    }
}

/// Position of a song in the final order, 1 being the favourite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(i32);

impl Rank {
    /// Sentinel held by every song before its session completes
    pub const UNRANKED: Rank = Rank(-1);

    /// Rank for a 0-based position in a finished order
    pub fn from_position(index: usize) -> Rank {
        Rank(i32::try_from(index).map_or(i32::MAX, |i| i.saturating_add(1)))
    }

    /// Raw integer value (-1 when unranked)
    pub fn value(&self) -> i32 {
        self.0
    }

    /// True once a session has assigned this rank
    pub fn is_ranked(&self) -> bool {
        self.0 > 0
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::UNRANKED
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ranked() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("-")
        }
    }
}

/// A song and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    path: PathBuf,
    artist: String,
    album: String,
    track_number: u32,
    title: String,
    rank: Rank,
}

impl Song {
    /// Create an unranked song
    pub fn new(
        path: impl Into<PathBuf>,
        artist: impl Into<String>,
        album: impl Into<String>,
        track_number: u32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            artist: artist.into(),
            album: album.into(),
            track_number,
            title: title.into(),
            rank: Rank::UNRANKED,
        }
    }

    /// File path, the song's identity
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn track_number(&self) -> u32 {
        self.track_number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.artist = artist.into();
    }

    pub fn set_album(&mut self, album: impl Into<String>) {
        self.album = album.into();
    }

    pub fn set_track_number(&mut self, track_number: u32) {
        self.track_number = track_number;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Only the materializer and list-level resets write ranks
    pub(crate) fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }

    /// Order by rank, ranked songs before unranked ones
    pub fn cmp_by_rank(&self, other: &Song) -> Ordering {
        match (self.rank.is_ranked(), other.rank.is_ranked()) {
            (true, true) => self.rank.cmp(&other.rank),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }

    /// Short "Artist - Title" label
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}
