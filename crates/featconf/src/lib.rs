//! Configuration loading for track feature extraction.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/track-features/config.toml` (system)
//! 2. `~/.config/track-features/config.toml` (user)
//! 3. `./track-features.toml`, or an explicit path passed by the caller
//! 4. Environment variables (`TRACK_FEATURES_*`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! cache_db = "~/.local/share/track-features/cache.db"
//!
//! [cache]
//! enabled = true
//! ```

pub mod loader;

pub use loader::{
    discover_config_files, discover_config_files_with_override, ConfigSources, PartialConfig,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// SQLite database holding cached feature records.
    #[serde(default = "PathsConfig::default_cache_db")]
    pub cache_db: PathBuf,
}

impl PathsConfig {
    fn default_cache_db() -> PathBuf {
        directories::BaseDirs::new()
            .map(|d| d.data_dir().join("track-features").join("cache.db"))
            .unwrap_or_else(|| PathBuf::from("track-features-cache.db"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_db: Self::default_cache_db(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,
}

impl CacheConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

/// Complete feature-extraction configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl FeaturesConfig {
    /// Load from the standard locations plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load with `config_path` standing in for `./track-features.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load and report which files and environment variables contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = FeaturesConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# Track feature extraction configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "cache_db = \"{}\"\n",
            self.paths.cache_db.display()
        ));

        output.push_str("\n[cache]\n");
        output.push_str(&format!("enabled = {}\n", self.cache.enabled));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeaturesConfig::default();
        assert!(config.cache.enabled);
        let file_name = config.paths.cache_db.file_name().unwrap().to_string_lossy();
        assert!(file_name.ends_with("cache.db"), "{}", file_name);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = FeaturesConfig {
            paths: PathsConfig {
                cache_db: PathBuf::from("/var/lib/features/cache.db"),
            },
            cache: CacheConfig { enabled: false },
        };
        let rendered = config.to_toml();
        assert!(rendered.contains("[paths]"));
        assert!(rendered.contains("[cache]"));

        let parsed: FeaturesConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.toml");
        std::fs::write(&path, "[cache]\nenabled = false\n").unwrap();

        let (config, sources) = FeaturesConfig::load_with_sources_from(Some(&path)).unwrap();
        assert!(!config.cache.enabled);
        assert!(sources.files.contains(&path));
    }

    #[test]
    fn test_bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[cache\nenabled = ").unwrap();

        match FeaturesConfig::load_from(Some(&path)) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
