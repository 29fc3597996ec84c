//! Live configuration of a session.

use serde_json::Value;

use super::types::{Config, ExcludeFn};
use super::{config_from_value, defaults_object};
use crate::error::{AureaError, AureaResult};
use crate::resize::rules::ExclusionRules;

/// Owns the active configuration together with its prepared exclusion rules.
///
/// Every update is checked in full before it is committed, so a rejected
/// update never leaves the store half-modified.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Config,
    rules: ExclusionRules,
}

impl ConfigStore {
    /// Creates a store from an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration breaks a numeric invariant or
    /// holds an invalid buffer pattern.
    pub fn new(config: Config) -> AureaResult<Self> {
        config.validate()?;
        let rules = ExclusionRules::from_config(&config)?;
        Ok(Self { config, rules })
    }

    /// Creates a store from user values deep-merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration is invalid.
    pub fn from_value(user: Value) -> AureaResult<Self> { Self::new(config_from_value(user)?) }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config { &self.config }

    /// Returns the exclusion rules prepared from the active configuration.
    #[must_use]
    pub const fn rules(&self) -> &ExclusionRules { &self.rules }

    /// Replaces the value of one top-level key.
    ///
    /// # Errors
    ///
    /// - [`AureaError::InvalidConfigKey`] if the key does not exist in the defaults
    /// - [`AureaError::InvalidConfigValue`] if the value has the wrong type or
    ///   breaks an invariant
    pub fn set(&mut self, key: &str, value: Value) -> AureaResult<()> {
        if !defaults_object().contains_key(key) {
            return Err(AureaError::InvalidConfigKey(key.to_string()));
        }

        let mut object = match serde_json::to_value(&self.config) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(AureaError::invalid_value(key, "configuration is not an object")),
            Err(err) => return Err(AureaError::invalid_value(key, err.to_string())),
        };
        object.insert(key.to_string(), value);

        let mut candidate: Config = serde_json::from_value(Value::Object(object))
            .map_err(|err| AureaError::invalid_value(key, err.to_string()))?;
        candidate.exclude_func.clone_from(&self.config.exclude_func);

        self.commit(candidate)?;
        tracing::debug!(key, "configuration updated");
        Ok(())
    }

    /// Sets the width multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`AureaError::InvalidConfigValue`] if the factor is not finite
    /// or not greater than zero.
    pub fn set_adjust_factor(&mut self, factor: f64) -> AureaResult<()> {
        let candidate = Config {
            adjust_factor: factor,
            ..self.config.clone()
        };
        self.commit(candidate)
    }

    /// Switches between the default and the widescreen width multiplier.
    ///
    /// Returns the factor now in effect.
    pub fn toggle_widescreen(&mut self) -> f64 {
        self.config.adjust_factor = if self.config.is_widescreen() {
            crate::resize::constants::defaults::ADJUST_FACTOR
        } else {
            self.config.wide_adjust_factor
        };
        self.config.adjust_factor
    }

    /// Installs or removes the programmatic exclusion predicate.
    pub fn set_exclude_func(&mut self, predicate: Option<ExcludeFn>) {
        self.config.exclude_func.clone_from(&predicate);
        self.rules.set_predicate(predicate);
    }

    fn commit(&mut self, candidate: Config) -> AureaResult<()> {
        candidate.validate()?;
        let rules = ExclusionRules::from_config(&candidate)?;
        self.config = candidate;
        self.rules = rules;
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        let config = Config::default();
        let rules = ExclusionRules::from_config(&config).unwrap_or_default();
        Self { config, rules }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::host::PaneId;

    #[test]
    fn test_set_updates_known_key() {
        let mut store = ConfigStore::default();
        store.set("ratio", json!(2.0)).unwrap();
        assert!((store.config().ratio - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_rejects_unknown_key_without_mutation() {
        let mut store = ConfigStore::default();
        let before = serde_json::to_value(store.config()).unwrap();

        let err = store.set("ratoi", json!(2.0)).unwrap_err();
        assert!(matches!(err, AureaError::InvalidConfigKey(ref key) if key == "ratoi"));
        assert_eq!(serde_json::to_value(store.config()).unwrap(), before);
    }

    #[test]
    fn test_set_rejects_exclude_func() {
        let mut store = ConfigStore::default();
        let err = store.set("exclude_func", json!(true)).unwrap_err();
        assert!(matches!(err, AureaError::InvalidConfigKey(_)));
    }

    #[test]
    fn test_set_rejects_wrong_type_without_mutation() {
        let mut store = ConfigStore::default();
        let err = store.set("minimal_width_change", json!("two")).unwrap_err();
        assert!(matches!(err, AureaError::InvalidConfigValue { ref key, .. } if key == "minimal_width_change"));
        assert_eq!(store.config().minimal_width_change, 2);
    }

    #[test]
    fn test_set_rejects_non_positive_ratio() {
        let mut store = ConfigStore::default();
        assert!(store.set("ratio", json!(0)).is_err());
        assert!((store.config().ratio - 1.618).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_invalid_pattern_keeps_previous_rules() {
        let mut store = ConfigStore::default();
        store.set("exclude_buffer_patterns", json!(["^term://"])).unwrap();
        assert!(store.set("exclude_buffer_patterns", json!(["("])).is_err());
        assert_eq!(store.config().exclude_buffer_patterns, vec!["^term://".to_string()]);
    }

    #[test]
    fn test_set_max_width_to_null_unsets_it() {
        let mut store = ConfigStore::default();
        store.set("max_width", json!(120)).unwrap();
        assert_eq!(store.config().max_width, Some(120));
        store.set("max_width", Value::Null).unwrap();
        assert_eq!(store.config().max_width, None);
    }

    #[test]
    fn test_set_keeps_exclude_func() {
        let mut store = ConfigStore::default();
        store.set_exclude_func(Some(ExcludeFn::new(|pane, _| pane == PaneId(1))));
        store.set("recenter", json!(true)).unwrap();
        assert!(store.config().exclude_func.is_some());
    }

    #[test]
    fn test_set_adjust_factor() {
        let mut store = ConfigStore::default();
        store.set_adjust_factor(0.7).unwrap();
        assert!((store.config().adjust_factor - 0.7).abs() < f64::EPSILON);
        assert!(store.set_adjust_factor(f64::INFINITY).is_err());
        assert!((store.config().adjust_factor - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_widescreen_round_trip() {
        let mut store = ConfigStore::default();
        assert!((store.toggle_widescreen() - 0.8).abs() < f64::EPSILON);
        assert!(store.config().is_widescreen());
        assert!((store.toggle_widescreen() - 1.0).abs() < f64::EPSILON);
        assert!(!store.config().is_widescreen());
    }

    #[test]
    fn test_from_value_merges_over_defaults() {
        let store = ConfigStore::from_value(json!({ "exclude_buffer_names": ["Scratch"] })).unwrap();
        assert!(store.config().exclude_buffer_names.contains("Scratch"));
        assert!(store.config().exclude_filetypes.contains("help"));
    }
}
