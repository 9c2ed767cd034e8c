//! # Songsort Import
//!
//! Turns a folder of audio files into a staging [`SongList`]:
//! 1. [`scanner`] walks the folder for supported files
//! 2. [`tags`] reads embedded artist/album/title/track tags
//! 3. [`heuristic`] fills whatever the tags leave empty from the file path
//!
//! Failures on individual files are reported and skipped; only an unusable
//! import folder aborts the batch.
//!
//! [`SongList`]: songsort_core::SongList

pub mod error;
pub mod heuristic;
pub mod importer;
pub mod scanner;
pub mod tags;

pub use error::{MetadataError, ScanError};
pub use heuristic::{metadata_from_path, song_from_path, PathMetadata};
pub use importer::{ImportIssue, ImportReport, Importer};
pub use scanner::{FileScanner, ScanResult};
pub use tags::{LoftyTagReader, TagInfo, TagReader};
