//! Configuration types.
//!
//! The [`Config`] record holds every tunable of the resize engine. It is
//! deserialized from JSONC files merged over [`Config::default()`] and is only
//! changed afterwards through [`ConfigStore`](super::ConfigStore) updates,
//! which validate before committing.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AureaError, AureaResult};
use crate::host::{ContentId, PaneId};
use crate::resize::constants::defaults;

/// Programmatic exclusion predicate.
///
/// Invoked with the pane and its content identity after every declarative
/// rule failed to match. Returning `true` excludes the pane.
#[derive(Clone)]
pub struct ExcludeFn(Arc<dyn Fn(PaneId, ContentId) -> bool + Send + Sync>);

impl ExcludeFn {
    /// Wraps a predicate.
    pub fn new<F>(predicate: F) -> Self
    where F: Fn(PaneId, ContentId) -> bool + Send + Sync + 'static {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn call(&self, pane: PaneId, content: ContentId) -> bool { (self.0)(pane, content) }
}

impl fmt::Debug for ExcludeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ExcludeFn(..)") }
}

/// Resize engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Proportion of the available space given to the focused pane.
    /// Must be greater than 0.
    /// Default: 1.618
    pub ratio: f64,

    /// Multiplier applied to the target width when `auto_scale` is off.
    /// Default: 1.0
    pub adjust_factor: f64,

    /// Width multiplier switched in by the widescreen toggle.
    /// Default: 0.8
    pub wide_adjust_factor: f64,

    /// Derive the width multiplier from the canvas width instead of
    /// `adjust_factor`: 1.0 at 100 columns, shrinking on wider canvases,
    /// never below 0.4.
    /// Default: false
    pub auto_scale: bool,

    /// Upper bound on the target width in columns. Unset or 0 disables it.
    /// Default: null
    pub max_width: Option<u32>,

    /// Center the focused pane's viewport on its cursor after resizing.
    /// Default: false
    pub recenter: bool,

    /// Width changes smaller than this many columns are skipped.
    /// Default: 2
    pub minimal_width_change: u32,

    /// Height changes smaller than this many lines are skipped.
    /// Default: 2
    pub minimal_height_change: u32,

    /// Filetypes whose panes are never resized.
    pub exclude_filetypes: BTreeSet<String>,

    /// Content names whose panes are never resized (exact match).
    pub exclude_buffer_names: BTreeSet<String>,

    /// Regular expressions matched against content names, in order.
    pub exclude_buffer_patterns: Vec<String>,

    /// Programmatic exclusion predicate, only settable from code.
    #[serde(skip)]
    #[schemars(skip)]
    pub exclude_func: Option<ExcludeFn>,

    /// Emit debug traces for exclusion decisions and resize passes.
    /// Default: false
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ratio: defaults::RATIO,
            adjust_factor: defaults::ADJUST_FACTOR,
            wide_adjust_factor: defaults::WIDE_ADJUST_FACTOR,
            auto_scale: false,
            max_width: None,
            recenter: false,
            minimal_width_change: defaults::MINIMAL_WIDTH_CHANGE,
            minimal_height_change: defaults::MINIMAL_HEIGHT_CHANGE,
            exclude_filetypes: defaults::EXCLUDE_FILETYPES.iter().map(ToString::to_string).collect(),
            exclude_buffer_names: BTreeSet::new(),
            exclude_buffer_patterns: Vec::new(),
            exclude_func: None,
            debug: false,
        }
    }
}

impl Config {
    /// Checks the numeric invariants of the record.
    ///
    /// # Errors
    ///
    /// Returns [`AureaError::InvalidConfigValue`] naming the first field that is
    /// not finite or not strictly positive.
    pub fn validate(&self) -> AureaResult<()> {
        for (key, value) in [
            ("ratio", self.ratio),
            ("adjust_factor", self.adjust_factor),
            ("wide_adjust_factor", self.wide_adjust_factor),
        ] {
            if !value.is_finite() {
                return Err(AureaError::invalid_value(key, "must be a finite number"));
            }
            if value <= 0.0 {
                return Err(AureaError::invalid_value(key, "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Returns true if widescreen mode is currently active.
    #[must_use]
    pub fn is_widescreen(&self) -> bool {
        (self.adjust_factor - defaults::ADJUST_FACTOR).abs() > f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert!((config.ratio - 1.618).abs() < f64::EPSILON);
        assert!((config.adjust_factor - 1.0).abs() < f64::EPSILON);
        assert!((config.wide_adjust_factor - 0.8).abs() < f64::EPSILON);
        assert!(!config.auto_scale);
        assert!(config.max_width.is_none());
        assert!(!config.recenter);
        assert!(config.exclude_filetypes.contains("help"));
        assert!(config.exclude_buffer_names.is_empty());
        assert!(config.exclude_func.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_partial_object() {
        let json = r#"{ "ratio": 2.0, "max_width": 120, "exclude_filetypes": ["qf"] }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!((config.ratio - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.max_width, Some(120));
        assert_eq!(config.exclude_filetypes.len(), 1);
        assert_eq!(config.minimal_width_change, 2);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let json = r#"{ "ratoi": 2.0 }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn test_serialized_defaults_contain_every_settable_key() {
        let value = serde_json::to_value(Config::default()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("max_width"));
        assert!(object["max_width"].is_null());
        assert!(!object.contains_key("exclude_func"));
    }

    #[test]
    fn test_validate_rejects_non_positive_ratio() {
        let config = Config {
            ratio: 0.0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ratio"));
    }

    #[test]
    fn test_validate_rejects_non_finite_factor() {
        let config = Config {
            adjust_factor: f64::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_widescreen() {
        let mut config = Config::default();
        assert!(!config.is_widescreen());
        config.adjust_factor = config.wide_adjust_factor;
        assert!(config.is_widescreen());
    }

    #[test]
    fn test_exclude_fn_is_callable_and_debuggable() {
        let predicate = ExcludeFn::new(|pane, _| pane == PaneId(3));
        assert!(predicate.call(PaneId(3), ContentId(1)));
        assert!(!predicate.call(PaneId(4), ContentId(1)));
        assert_eq!(format!("{predicate:?}"), "ExcludeFn(..)");
    }
}
