//! Error types for songsort-core
//!
//! All errors are reported synchronously from the call that caused them.

use crate::song::SongId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for songsort-core
#[derive(Error, Debug)]
pub enum Error {
    /// Operation not allowed in the current session or review state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Session started over too few songs while trivial sessions are disabled
    #[error("Insufficient input: {count} song(s), at least 2 required")]
    InsufficientInput {
        /// Number of songs offered to the session
        count: usize,
    },

    /// Song handle does not refer to an entry of the list
    #[error("Song not found: {0}")]
    SongNotFound(SongId),

    /// A song with the same path already exists in the list
    #[error("Duplicate song path: {}", .0.display())]
    DuplicateSong(PathBuf),
}

/// Convenience Result type using songsort-core Error
pub type Result<T> = std::result::Result<T, Error>;
