//! Error types for songsort-import

use std::path::PathBuf;
use thiserror::Error;

/// Folder scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {}: {1}", .0.display())]
    FileAccessError(PathBuf, String),
}

/// Tag reading errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Tag library could not parse the file
    #[error("Failed to read tags: {0}")]
    ReadError(String),
}
