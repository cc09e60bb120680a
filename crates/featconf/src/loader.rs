//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, FeaturesConfig};
use std::env;
use std::path::{Path, PathBuf};

const ENV_CACHE_DB: &str = "TRACK_FEATURES_CACHE_DB";
const ENV_CACHE_ENABLED: &str = "TRACK_FEATURES_CACHE_ENABLED";

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a caller-supplied override path.
///
/// If `override_path` exists it replaces the local `./track-features.toml`.
/// Returns only files that exist, in load order.
pub fn discover_config_files_with_override(override_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/track-features/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("track-features/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = override_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("track-features.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Values a single config file sets. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialConfig {
    pub cache_db: Option<PathBuf>,
    pub cache_enabled: Option<bool>,
}

/// Load the values a TOML file sets.
pub fn load_from_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<PartialConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut partial = PartialConfig::default();

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("cache_db").and_then(|v| v.as_str()) {
            partial.cache_db = Some(expand_path(v));
        }
    }

    if let Some(cache) = table.get("cache").and_then(|v| v.as_table()) {
        if let Some(v) = cache.get("enabled") {
            let enabled = v.as_bool().ok_or_else(|| ConfigError::Parse {
                path: path.to_path_buf(),
                message: format!("cache.enabled must be a boolean, got {v}"),
            })?;
            partial.cache_enabled = Some(enabled);
        }
    }

    Ok(partial)
}

/// Layer `overlay` on `base`; every value the overlay sets wins.
pub fn merge_configs(mut base: FeaturesConfig, overlay: PartialConfig) -> FeaturesConfig {
    if let Some(cache_db) = overlay.cache_db {
        base.paths.cache_db = cache_db;
    }
    if let Some(enabled) = overlay.cache_enabled {
        base.cache.enabled = enabled;
    }
    base
}

/// Apply `TRACK_FEATURES_*` environment overrides.
pub fn apply_env_overrides(config: &mut FeaturesConfig, sources: &mut ConfigSources) {
    apply_overrides(config, sources, env::vars());
}

/// Apply overrides from arbitrary `(name, value)` pairs. Unparseable values are skipped.
pub fn apply_overrides<I>(config: &mut FeaturesConfig, sources: &mut ConfigSources, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        match key.as_str() {
            ENV_CACHE_DB => {
                config.paths.cache_db = expand_path(&value);
                sources.env_overrides.push(key);
            }
            ENV_CACHE_ENABLED => {
                if let Some(enabled) = parse_bool(&value) {
                    config.cache.enabled = enabled;
                    sources.env_overrides.push(key);
                }
            }
            _ => {}
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand `~/` and a leading `$VAR/` in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        let (var_name, rest) = match stripped.find('/') {
            Some(slash) => (&stripped[..slash], Some(&stripped[slash + 1..])),
            None => (stripped, None),
        };
        if let Ok(var_value) = env::var(var_name) {
            let base = PathBuf::from(var_value);
            return match rest {
                Some(rest) => base.join(rest),
                None => base,
            };
        }
    }

    PathBuf::from(path)
}
