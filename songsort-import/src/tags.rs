//! Embedded tag reading
//!
//! [`TagReader`] is the seam between the importer and the tag library, so
//! tests can feed tags without real audio files.

use crate::error::MetadataError;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;

/// Tags found in a file; blank values are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track_number: Option<u32>,
}

impl TagInfo {
    /// Build from raw tag values, dropping blank strings and track 0
    pub fn new(
        artist: Option<String>,
        album: Option<String>,
        title: Option<String>,
        track_number: Option<u32>,
    ) -> Self {
        Self {
            artist: non_blank(artist),
            album: non_blank(album),
            title: non_blank(title),
            track_number: track_number.filter(|n| *n > 0),
        }
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.album.is_none()
            && self.title.is_none()
            && self.track_number.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Source of embedded tags
pub trait TagReader: Send + Sync {
    /// Read tags from `path`
    ///
    /// A readable file without tags yields an empty [`TagInfo`], not an error.
    fn read_tags(&self, path: &Path) -> Result<TagInfo, MetadataError>;
}

/// [`TagReader`] backed by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, MetadataError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::ReadError(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ReadError(e.to_string()))?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            tracing::debug!(file = %path.display(), "No tags present");
            return Ok(TagInfo::default());
        };

        let info = TagInfo::new(
            tag.artist().map(|s| s.to_string()),
            tag.album().map(|s| s.to_string()),
            tag.title().map(|s| s.to_string()),
            tag.track(),
        );

        tracing::debug!(
            file = %path.display(),
            artist = ?info.artist,
            title = ?info.title,
            "Read tags"
        );

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_blank_values_are_dropped() {
        let info = TagInfo::new(
            Some("  ".to_string()),
            Some(" Album ".to_string()),
            None,
            Some(0),
        );
        assert_eq!(info.artist, None);
        assert_eq!(info.album.as_deref(), Some("Album"));
        assert_eq!(info.track_number, None);
        assert!(!info.is_empty());
        assert!(TagInfo::default().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = LoftyTagReader.read_tags(Path::new("/nonexistent/songsort/song.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.flac");
        fs::write(&path, b"fLaC this is not a real stream").unwrap();
        assert!(LoftyTagReader.read_tags(&path).is_err());
    }
}
