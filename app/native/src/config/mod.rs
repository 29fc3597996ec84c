//! Configuration module for Aurea.
//!
//! This module provides configuration types, file discovery and loading, the
//! deep merge of user values over defaults, and the [`ConfigStore`] that owns
//! the live configuration of a session.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

mod store;
pub mod template;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

pub use store::ConfigStore;
pub use types::{Config, ExcludeFn};

use crate::error::{AureaError, AureaResult};

/// Errors that can occur when reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// `config init` would overwrite an existing file.
    #[error("configuration file already exists at: {}\nUse --force to overwrite.", .0.display())]
    AlreadyExists(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".aurea.jsonc", ".aurea.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/aurea/config.jsonc` when the variable is set
/// 2. `~/.config/aurea/config.jsonc` or `config.json`
/// 3. The platform configuration directory (`~/Library/Application Support` on macOS)
/// 4. `~/.aurea.jsonc` or `~/.aurea.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let aurea_dir = PathBuf::from(xdg_config).join("aurea");
        for filename in CONFIG_FILE_NAMES {
            paths.push(aurea_dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let aurea_dir = home.join(".config").join("aurea");
        for filename in CONFIG_FILE_NAMES {
            let path = aurea_dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let aurea_dir = config_dir.join("aurea");
        for filename in CONFIG_FILE_NAMES {
            let path = aurea_dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Returns the first configuration file that exists, if any.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> { config_paths().into_iter().find(|p| p.exists()) }

/// Recursively merges `overlay` into `base`.
///
/// Objects are merged key by key; any other overlay value (scalars, arrays,
/// `null`) replaces the base value outright.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Serializes the default configuration as a JSON object.
#[must_use]
pub fn defaults_object() -> Map<String, Value> {
    match serde_json::to_value(Config::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Builds a configuration from a user value merged over the defaults.
///
/// Unknown top-level keys are reported and dropped.
///
/// # Errors
///
/// Returns an error if a known key has a value of the wrong type or the
/// merged configuration breaks a numeric invariant.
pub fn config_from_value(user: Value) -> AureaResult<Config> {
    let defaults = defaults_object();

    let user = match user {
        Value::Object(mut map) => {
            map.retain(|key, _| {
                let known = defaults.contains_key(key);
                if !known {
                    tracing::warn!(key = %key, "ignoring unknown configuration key");
                }
                known
            });
            Value::Object(map)
        }
        Value::Null => Value::Object(Map::new()),
        other => {
            return Err(AureaError::invalid_value(
                "<root>",
                format!("expected an object, got {other}"),
            ));
        }
    };

    let mut merged = Value::Object(defaults);
    deep_merge(&mut merged, user);

    let config: Config = serde_json::from_value(merged)
        .map_err(|err| AureaError::invalid_value("<root>", err.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, is not valid
/// JSONC, or holds invalid values.
pub fn load_config_from_path(path: &Path) -> AureaResult<Config> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }
    let file = fs::File::open(path).map_err(ConfigError::from)?;
    let reader = json_comments::StripComments::new(file);
    let value: Value = serde_json::from_reader(reader).map_err(ConfigError::from)?;
    config_from_value(value)
}

/// Loads the configuration from the first available config file.
///
/// Returns the defaults when no configuration file exists.
///
/// # Errors
///
/// Returns an error if the file that was found cannot be loaded.
pub fn load_config() -> AureaResult<(Config, Option<PathBuf>)> {
    match find_config_file() {
        Some(path) => {
            let config = load_config_from_path(&path)?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_deep_merge_overrides_scalars() {
        let mut base = json!({ "ratio": 1.618, "debug": false });
        deep_merge(&mut base, json!({ "debug": true }));
        assert_eq!(base, json!({ "ratio": 1.618, "debug": true }));
    }

    #[test]
    fn test_deep_merge_recurses_into_objects() {
        let mut base = json!({ "outer": { "a": 1, "b": 2 } });
        deep_merge(&mut base, json!({ "outer": { "b": 3 } }));
        assert_eq!(base, json!({ "outer": { "a": 1, "b": 3 } }));
    }

    #[test]
    fn test_deep_merge_replaces_arrays() {
        let mut base = json!({ "list": ["a", "b"] });
        deep_merge(&mut base, json!({ "list": ["c"] }));
        assert_eq!(base, json!({ "list": ["c"] }));
    }

    #[test]
    fn test_config_from_value_inherits_unset_keys() {
        let config = config_from_value(json!({ "ratio": 2.0 })).unwrap();
        assert!((config.ratio - 2.0).abs() < f64::EPSILON);
        assert!((config.adjust_factor - 1.0).abs() < f64::EPSILON);
        assert!(config.exclude_filetypes.contains("help"));
    }

    #[test]
    fn test_config_from_value_drops_unknown_keys() {
        let config = config_from_value(json!({ "ratoi": 3.0, "recenter": true })).unwrap();
        assert!(config.recenter);
        assert!((config.ratio - 1.618).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_from_value_rejects_wrong_types() {
        let err = config_from_value(json!({ "ratio": "golden" })).unwrap_err();
        assert!(matches!(err, AureaError::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_config_from_value_rejects_invalid_ratio() {
        let err = config_from_value(json!({ "ratio": -1.0 })).unwrap_err();
        assert!(err.to_string().contains("ratio"));
    }

    #[test]
    fn test_config_from_null_is_default() {
        let config = config_from_value(Value::Null).unwrap();
        assert_eq!(config.minimal_height_change, 2);
    }

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                // golden ratio by default
                "ratio": 1.5, /* wider panes */
                "exclude_buffer_patterns": ["^term://"]
            }}"#
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert!((config.ratio - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.exclude_buffer_patterns, vec!["^term://".to_string()]);
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from_path(&dir.path().join("missing.jsonc")).unwrap_err();
        assert!(matches!(err, AureaError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_from_path_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, AureaError::Config(ConfigError::Parse(_))));
    }
}
