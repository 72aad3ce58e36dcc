//! Configuration errors.
//!
//! Validation errors name the offending key in dotted form
//! (`platform.public_key`) so they can be matched against the TOML file or
//! the `HOOKCORD_PLATFORM__PUBLIC_KEY` variable.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// A source could not be read or did not match the schema.
    #[error("could not read configuration: {0}")]
    Parse(String),

    /// A value the runtime cannot start without is blank.
    #[error("`{key}` must be set")]
    MissingField { key: &'static str },

    /// A value is present but unusable.
    #[error("`{key}` {reason}")]
    Invalid { key: &'static str, reason: String },

    /// A URL value has the wrong shape.
    #[error("`{key}` is not a usable URL ({url}): {reason}")]
    InvalidUrl {
        key: &'static str,
        url: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(key: &'static str) -> Self {
        Self::MissingField { key }
    }

    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    /// Dotted key of the offending value, for validation errors.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { key } | Self::Invalid { key, .. } | Self::InvalidUrl { key, .. } => {
                Some(key)
            }
            Self::FileNotFound(_) | Self::Parse(_) => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
