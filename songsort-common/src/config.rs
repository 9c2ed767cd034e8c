//! Configuration loading and resolution
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line argument, highest priority)
//! 2. `SONGSORT_CONFIG` environment variable
//! 3. `<config_dir>/songsort/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! Only an explicit path is allowed to fail loading. A missing or broken file
//! found through the other tiers logs a warning and the defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "SONGSORT_CONFIG";

/// Config file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level TOML configuration
///
/// Every section and field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Folder import settings
    pub import: ImportConfig,
    /// Comparison session settings
    pub ranking: RankingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Folder import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Accepted file extensions, lowercase, without the dot
    pub extensions: Vec<String>,
    /// File or directory names containing any of these are skipped
    pub ignore_patterns: Vec<String>,
    /// Maximum directory depth below the import folder
    pub max_depth: Option<usize>,
    /// Check file headers in addition to extensions
    pub verify_magic_bytes: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string(), "flac".to_string()],
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
            max_depth: None,
            verify_magic_bytes: true,
        }
    }
}

/// Comparison session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Comparison schedule used by new sessions
    pub strategy: SortStrategy,
    /// Complete sessions over fewer than two songs immediately instead of
    /// rejecting them
    pub allow_trivial_sessions: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            strategy: SortStrategy::default(),
            allow_trivial_sessions: true,
        }
    }
}

/// Comparison schedule of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Insert each song into the ordered prefix by binary search
    #[default]
    BinaryInsertion,
    /// Bottom-up merge sort
    Merge,
}

impl SortStrategy {
    /// Name used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::BinaryInsertion => "binary_insertion",
            SortStrategy::Merge => "merge",
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "binary_insertion" | "insertion" => Ok(SortStrategy::BinaryInsertion),
            "merge" => Ok(SortStrategy::Merge),
            other => Err(Error::InvalidInput(format!(
                "unknown sort strategy '{}' (expected binary_insertion or merge)",
                other
            ))),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))
    }
}

/// Write configuration to a TOML file, creating parent directories
///
/// Writes to a temporary sibling first and renames it over the target.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = config.to_toml_string()?;
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    debug!(path = %path.display(), "Config written");
    Ok(())
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given on the command line
    Explicit(PathBuf),
    /// Path taken from `SONGSORT_CONFIG`
    Environment(PathBuf),
    /// Per-user config file
    UserConfig(PathBuf),
    /// No file, compiled defaults
    Defaults,
}

/// Resolves and loads the configuration following the priority order above
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create resolver without an explicit path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create resolver with a command-line supplied path
    pub fn with_explicit_path(path: Option<PathBuf>) -> Self {
        Self {
            explicit_path: path,
        }
    }

    /// Determine which config file would be used, without reading it
    pub fn source(&self) -> ConfigSource {
        if let Some(path) = &self.explicit_path {
            return ConfigSource::Explicit(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        match default_config_path() {
            Some(path) if path.exists() => ConfigSource::UserConfig(path),
            _ => ConfigSource::Defaults,
        }
    }

    /// Load the effective configuration
    pub fn load(&self) -> Result<TomlConfig> {
        match self.source() {
            ConfigSource::Explicit(path) => {
                let config = TomlConfig::load_from_path(&path)?;
                info!(path = %path.display(), "Loaded config");
                Ok(config)
            }
            ConfigSource::Environment(path) | ConfigSource::UserConfig(path) => {
                match TomlConfig::load_from_path(&path) {
                    Ok(config) => {
                        info!(path = %path.display(), "Loaded config");
                        Ok(config)
                    }
                    Err(e) => {
                        warn!("{}; using default configuration", e);
                        Ok(TomlConfig::default())
                    }
                }
            }
            ConfigSource::Defaults => {
                debug!("No config file found, using default configuration");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Per-user config file location (`~/.config/songsort/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songsort").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.import.extensions, vec!["mp3", "flac"]);
        assert!(config.ranking.allow_trivial_sessions);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [ranking]
            strategy = "merge"
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.strategy, SortStrategy::Merge);
        assert!(config.ranking.allow_trivial_sessions);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[ranking\nstrategy = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "binary-insertion".parse::<SortStrategy>().unwrap(),
            SortStrategy::BinaryInsertion
        );
        assert_eq!("MERGE".parse::<SortStrategy>().unwrap(), SortStrategy::Merge);
        assert!("bubble".parse::<SortStrategy>().is_err());
    }
}
