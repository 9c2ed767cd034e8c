//! # Songsort Common Library
//!
//! Shared code for the songsort crates:
//! - Error type and result alias
//! - TOML configuration loading and resolution
//! - Sort strategy selection

pub mod config;
pub mod error;

pub use config::{SortStrategy, TomlConfig};
pub use error::{Error, Result};
