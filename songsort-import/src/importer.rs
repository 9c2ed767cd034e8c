//! Batch importer
//!
//! Scans a folder, reads tags in parallel and builds a staging [`SongList`].
//! Per file, embedded tags win and the path heuristic fills whatever they
//! leave empty. A file whose tags cannot be read is still imported from its
//! path; the read failure is reported as a warning.

use crate::error::ScanError;
use crate::heuristic::metadata_from_path;
use crate::scanner::FileScanner;
use crate::tags::{LoftyTagReader, TagInfo, TagReader};
use rayon::prelude::*;
use songsort_common::config::ImportConfig;
use songsort_core::{Song, SongList};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Problem with a single file or folder entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    /// Affected path, when known
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Result of importing one folder
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Imported songs, unranked, in path order
    pub songs: SongList,
    /// Entries skipped because they could not be read
    pub failures: Vec<ImportIssue>,
    /// Files imported from their path only because tag reading failed
    pub warnings: Vec<ImportIssue>,
    /// Files skipped because their path was already imported
    pub duplicates: usize,
    /// Songs that took at least one field from embedded tags
    pub tagged: usize,
}

impl ImportReport {
    /// True when every discovered entry was imported cleanly
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Combines scanner, tag reader and path heuristic
pub struct Importer<R: TagReader = LoftyTagReader> {
    scanner: FileScanner,
    reader: R,
}

impl Importer<LoftyTagReader> {
    pub fn new(config: &ImportConfig) -> Self {
        Self::with_reader(config, LoftyTagReader)
    }
}

impl<R: TagReader> Importer<R> {
    /// Importer with a custom tag source
    pub fn with_reader(config: &ImportConfig, reader: R) -> Self {
        Self {
            scanner: FileScanner::new(config),
            reader,
        }
    }

    /// Import every supported file below `root`
    ///
    /// Only a missing or non-directory `root` is an error.
    pub fn import_folder(&self, root: &Path) -> Result<ImportReport, ScanError> {
        info!(folder = %root.display(), "Importing folder");
        let scan = self.scanner.scan(root)?;

        let mut report = self.import_files(&scan.files);
        let mut failures: Vec<ImportIssue> = scan
            .errors
            .into_iter()
            .map(|(path, message)| ImportIssue { path, message })
            .collect();
        failures.append(&mut report.failures);
        report.failures = failures;

        info!(
            folder = %root.display(),
            songs = report.songs.len(),
            tagged = report.tagged,
            failures = report.failures.len(),
            warnings = report.warnings.len(),
            duplicates = report.duplicates,
            "Import complete"
        );
        Ok(report)
    }

    /// Import an explicit list of files, in the given order
    pub fn import_files(&self, files: &[PathBuf]) -> ImportReport {
        let read: Vec<_> = files
            .par_iter()
            .map(|path| (path, self.reader.read_tags(path)))
            .collect();

        let mut report = ImportReport::default();
        for (path, tags) in read {
            let tags = match tags {
                Ok(tags) => tags,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Tags unreadable, using file path");
                    report.warnings.push(ImportIssue {
                        path: Some(path.clone()),
                        message: e.to_string(),
                    });
                    TagInfo::default()
                }
            };

            if !tags.is_empty() {
                report.tagged += 1;
            }

            match report.songs.insert(merge_metadata(path, tags)) {
                Ok(id) => debug!(file = %path.display(), %id, "Imported"),
                Err(songsort_core::Error::DuplicateSong(_)) => {
                    debug!(file = %path.display(), "Duplicate path skipped");
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping file");
                    report.failures.push(ImportIssue {
                        path: Some(path.clone()),
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Tag values first, path guesses for anything missing
fn merge_metadata(path: &Path, tags: TagInfo) -> Song {
    let guess = metadata_from_path(path);
    Song::new(
        path,
        tags.artist.unwrap_or(guess.artist),
        tags.album.unwrap_or(guess.album),
        tags.track_number.or(guess.track_number).unwrap_or(0),
        tags.title.unwrap_or(guess.title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;

    struct NoTags;

    impl TagReader for NoTags {
        fn read_tags(&self, _path: &Path) -> Result<TagInfo, MetadataError> {
            Ok(TagInfo::default())
        }
    }

    #[test]
    fn test_tags_override_path_guess() {
        let tags = TagInfo::new(None, Some("Real Album".to_string()), Some("Real Title".to_string()), None);
        let song = merge_metadata(Path::new("/m/Guess Artist/Guess Album/04 - Guess.mp3"), tags);
        assert_eq!(song.artist(), "Guess Artist");
        assert_eq!(song.album(), "Real Album");
        assert_eq!(song.title(), "Real Title");
        assert_eq!(song.track_number(), 4);
    }

    #[test]
    fn test_duplicate_paths_are_counted() {
        let importer = Importer::with_reader(&ImportConfig::default(), NoTags);
        let path = PathBuf::from("/m/A/B/01 - x.mp3");
        let report = importer.import_files(&[path.clone(), path]);
        assert_eq!(report.songs.len(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.tagged, 0);
        assert!(report.is_clean());
    }
}
