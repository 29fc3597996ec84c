//! Exclusion rule matching.
//!
//! Decides whether a pane is exempt from resizing. Excluded panes keep their
//! size through a resize pass and shrink the space available to the focused
//! pane.
//!
//! # Rule Order
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Invalid or destroyed content
//! 2. Filetype in `exclude_filetypes`
//! 3. Content name in `exclude_buffer_names` (exact match)
//! 4. Content name matching `exclude_buffer_patterns` (in list order)
//! 5. `exclude_func` returning `true`
//!
//! The predicate is never invoked when a declarative rule already matched.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::config::{Config, ExcludeFn};
use crate::error::{AureaError, AureaResult};
use crate::host::{ContentInfo, Pane};

/// Why a pane was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "rule", content = "index")]
pub enum ExclusionReason {
    /// The pane's content is invalid or destroyed.
    InvalidContent,
    /// The content's filetype is excluded.
    Filetype,
    /// The content's name is excluded.
    BufferName,
    /// The content's name matched the pattern at this index.
    BufferPattern(usize),
    /// The exclusion predicate returned `true`.
    Predicate,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContent => f.write_str("invalid content"),
            Self::Filetype => f.write_str("filetype"),
            Self::BufferName => f.write_str("buffer name"),
            Self::BufferPattern(index) => write!(f, "buffer pattern #{index}"),
            Self::Predicate => f.write_str("predicate"),
        }
    }
}

/// Exclusion rules prepared from a configuration.
///
/// Patterns are compiled once when the configuration changes instead of on
/// every resize pass.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    filetypes: BTreeSet<String>,
    buffer_names: BTreeSet<String>,
    patterns: Vec<Regex>,
    predicate: Option<ExcludeFn>,
    debug: bool,
}

impl ExclusionRules {
    /// Prepares the rules of a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AureaError::InvalidConfigValue`] if a buffer pattern is not a
    /// valid regular expression.
    pub fn from_config(config: &Config) -> AureaResult<Self> {
        let patterns = config
            .exclude_buffer_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| {
                    AureaError::invalid_value(
                        "exclude_buffer_patterns",
                        format!("invalid pattern `{pattern}`: {err}"),
                    )
                })
            })
            .collect::<AureaResult<Vec<_>>>()?;

        Ok(Self {
            filetypes: config.exclude_filetypes.clone(),
            buffer_names: config.exclude_buffer_names.clone(),
            patterns,
            predicate: config.exclude_func.clone(),
            debug: config.debug,
        })
    }

    /// Replaces the programmatic exclusion predicate.
    pub fn set_predicate(&mut self, predicate: Option<ExcludeFn>) { self.predicate = predicate; }

    /// Classifies a pane, returning the first rule that excludes it.
    ///
    /// # Arguments
    ///
    /// * `pane` - The pane to check
    /// * `content` - The pane's resolved content, `None` if it is invalid
    #[must_use]
    pub fn classify(&self, pane: &Pane, content: Option<&ContentInfo>) -> Option<ExclusionReason> {
        let reason = self.first_match(pane, content);
        if self.debug {
            if let Some(reason) = reason {
                tracing::debug!(pane = %pane.id, rule = %reason, "pane excluded");
            }
        }
        reason
    }

    /// Returns true if the pane is exempt from resizing.
    #[must_use]
    pub fn is_excluded(&self, pane: &Pane, content: Option<&ContentInfo>) -> bool {
        self.classify(pane, content).is_some()
    }

    fn first_match(&self, pane: &Pane, content: Option<&ContentInfo>) -> Option<ExclusionReason> {
        let Some(content) = content else {
            return Some(ExclusionReason::InvalidContent);
        };

        if self.filetypes.contains(&content.filetype) {
            return Some(ExclusionReason::Filetype);
        }

        if self.buffer_names.contains(&content.name) {
            return Some(ExclusionReason::BufferName);
        }

        if let Some(index) = self.patterns.iter().position(|re| re.is_match(&content.name)) {
            return Some(ExclusionReason::BufferPattern(index));
        }

        if let Some(predicate) = &self.predicate {
            if predicate.call(pane.id, content.id) {
                return Some(ExclusionReason::Predicate);
            }
        }

        None
    }
}
