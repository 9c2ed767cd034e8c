//! Audio file scanner
//!
//! Recursive discovery of supported audio files in two phases:
//! - Phase 1: sequential directory traversal with ignore patterns; symlinks are
//!   followed, each link target is visited once and loops are reported
//! - Phase 2: parallel header verification of the candidates
//!
//! Entries that cannot be read are logged, recorded in the result and skipped.
//! Results are sorted by path so repeated scans import songs in the same order.

use crate::error::ScanError;
use rayon::prelude::*;
use songsort_common::config::ImportConfig;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Scan result with statistics
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Audio files found, sorted by path
    pub files: Vec<PathBuf>,
    /// Count of files by extension
    pub by_format: HashMap<String, usize>,
    /// Entries skipped because they could not be read
    pub errors: Vec<(Option<PathBuf>, String)>,
}

/// Audio file scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
    ignore_patterns: Vec<String>,
    max_depth: Option<usize>,
    verify_magic_bytes: bool,
}

impl FileScanner {
    /// Create scanner from import settings
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ignore_patterns: config.ignore_patterns.clone(),
            max_depth: config.max_depth,
            verify_magic_bytes: config.verify_magic_bytes,
        }
    }

    /// Scan directory for audio files
    pub fn scan(&self, root_path: &Path) -> Result<ScanResult, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut result = ScanResult::default();

        // Phase 1: Sequential directory traversal + symlink detection
        // This must be sequential because symlink_visited is mutable
        let mut candidate_files = Vec::new();
        let mut symlink_visited = HashSet::new();

        let walker = WalkDir::new(root_path)
            .follow_links(true)
            .sort_by_file_name()
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_supported_extension(entry.path()) {
                        candidate_files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    result
                        .errors
                        .push((e.path().map(Path::to_path_buf), e.to_string()));
                }
            }
        }

        tracing::debug!(
            "Phase 1 complete: {} candidate files discovered",
            candidate_files.len()
        );

        // Phase 2: Parallel header verification
        let verified: Vec<Result<Option<PathBuf>, ScanError>> = candidate_files
            .par_iter()
            .map(|path| {
                if !self.verify_magic_bytes {
                    return Ok(Some(path.clone()));
                }
                self.has_audio_header(path)
                    .map(|is_audio| is_audio.then(|| path.clone()))
            })
            .collect();

        for outcome in verified {
            match outcome {
                Ok(Some(path)) => result.files.push(path),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{}", e);
                    let path = match &e {
                        ScanError::FileAccessError(path, _) => Some(path.clone()),
                        _ => None,
                    };
                    result.errors.push((path, e.to_string()));
                }
            }
        }

        result.files.sort();
        for file in &result.files {
            if let Some(ext) = file.extension() {
                *result
                    .by_format
                    .entry(ext.to_string_lossy().to_lowercase())
                    .or_insert(0) += 1;
            }
        }

        tracing::debug!(
            "Phase 2 complete: {} audio files verified from {} candidates",
            result.files.len(),
            candidate_files.len()
        );

        Ok(result)
    }

    /// Check if entry should be processed
    fn should_process_entry(
        &self,
        entry: &DirEntry,
        symlink_visited: &mut HashSet<PathBuf>,
    ) -> bool {
        // Never filter out the folder the user picked
        if entry.depth() == 0 {
            return true;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern.as_str()) {
                return false;
            }
        }

        // Visit each symlink target once
        if entry.path_is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink target already visited: {}", path.display());
                    return false;
                }
            }
        }

        true
    }

    /// Check the extension against the configured list
    pub fn has_supported_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map_or(false, |ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Verify file type using magic bytes
    fn has_audio_header(&self, path: &Path) -> Result<bool, ScanError> {
        let mut file = File::open(path)
            .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

        let mut buffer = [0u8; 12];
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

        Ok(is_audio_header(&buffer[..bytes_read]))
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}

/// Recognize the leading bytes of common audio containers
pub fn is_audio_header(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false; // Too small to be audio
    }

    match header {
        // MP3 frame sync
        [0xFF, 0xFB, ..] | [0xFF, 0xF3, ..] | [0xFF, 0xF2, ..] | [0xFF, 0xFA, ..] => true,
        // MP3 with ID3 tag
        [b'I', b'D', b'3', ..] => true,
        // FLAC
        [b'f', b'L', b'a', b'C', ..] => true,
        // OGG (Vorbis/Opus)
        [b'O', b'g', b'g', b'S', ..] => true,
        // M4A/AAC (MP4 container)
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => true,
        // WAV
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_detection() {
        let scanner = FileScanner::default();
        assert!(scanner.has_supported_extension(Path::new("/a/song.mp3")));
        assert!(scanner.has_supported_extension(Path::new("/a/song.FLAC")));
        assert!(!scanner.has_supported_extension(Path::new("/a/song.ogg")));
        assert!(!scanner.has_supported_extension(Path::new("/a/cover.jpg")));
        assert!(!scanner.has_supported_extension(Path::new("/a/README")));
    }

    #[test]
    fn test_header_detection() {
        assert!(is_audio_header(b"ID3\x04\x00\x00\x00\x00"));
        assert!(is_audio_header(b"fLaC\x00\x00\x00\x22"));
        assert!(is_audio_header(&[0xFF, 0xFB, 0x90, 0x64]));
        assert!(!is_audio_header(b"hello world"));
        assert!(!is_audio_header(b"ID3"));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = FileScanner::default();
        match scanner.scan(Path::new("/nonexistent/songsort/path")) {
            Err(ScanError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("song.mp3");
        fs::write(&file, b"ID3\x04\x00\x00\x00\x00").unwrap();

        let scanner = FileScanner::default();
        assert!(matches!(scanner.scan(&file), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let result = FileScanner::default().scan(dir.path()).unwrap();
        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_scan_without_header_check_accepts_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("a.flac"), b"").unwrap();

        let config = ImportConfig {
            verify_magic_bytes: false,
            ..ImportConfig::default()
        };
        let result = FileScanner::new(&config).scan(dir.path()).unwrap();
        assert_eq!(
            result.files,
            vec![dir.path().join("a.flac"), dir.path().join("b.mp3")]
        );
        assert_eq!(result.by_format.get("mp3"), Some(&1));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_followed_once() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let album = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("01 - Real.mp3"), b"ID3\x04\x00\x00\x00\x00").unwrap();

        let elsewhere = TempDir::new().unwrap();
        let outside = elsewhere.path().join("Linked.flac");
        fs::write(&outside, b"fLaC\x00\x00\x00\x22").unwrap();
        symlink(&outside, album.join("02 - Linked.flac")).unwrap();
        symlink(&outside, album.join("03 - Again.flac")).unwrap();
        // Directory link back to an ancestor
        symlink(dir.path(), album.join("loop")).unwrap();

        let result = FileScanner::default().scan(dir.path()).unwrap();
        assert_eq!(
            result.files,
            vec![album.join("01 - Real.mp3"), album.join("02 - Linked.flac")]
        );
    }
}
