//! Error types for Aurea.
//!
//! This module provides the unified error type returned by the command
//! surface and the configuration store. Each error kind maps to the notice
//! level it is reported at, so callers can surface it to the user without
//! deciding severity themselves.

use thiserror::Error;

use crate::config::ConfigError;
use crate::host::{HostError, NoticeLevel};
use crate::session::SessionPhase;

/// Result type alias for Aurea operations.
pub type AureaResult<T> = Result<T, AureaError>;

/// Errors that can occur while configuring or driving a session.
#[derive(Debug, Error)]
pub enum AureaError {
    /// A runtime `set` named a key that does not exist in the defaults.
    #[error("unknown configuration key `{0}`")]
    InvalidConfigKey(String),

    /// A configuration value has the wrong type or is out of range.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidConfigValue {
        /// The offending configuration key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The adjust command was given something that is not a finite number.
    #[error("adjust factor must be a number, got `{0}`")]
    InvalidFactorArgument(String),

    /// Enable was requested while enabled, or disable while disabled.
    #[error("aurea is already {0}")]
    AlreadyInState(SessionPhase),

    /// Loading the configuration file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host operation outside the resize sequence failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl AureaError {
    /// Creates an invalid value error for the given key.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the level this error is reported at when shown to the user.
    #[must_use]
    pub const fn notice_level(&self) -> NoticeLevel {
        match self {
            Self::AlreadyInState(_) => NoticeLevel::Info,
            Self::InvalidConfigKey(_) | Self::InvalidConfigValue { .. } | Self::Config(_) => {
                NoticeLevel::Warn
            }
            Self::InvalidFactorArgument(_) | Self::Host(_) => NoticeLevel::Error,
        }
    }
}
