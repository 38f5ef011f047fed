//! Core error types for Legible.
//!
//! This module defines the central error type shared by all crates, plus the
//! configuration error raised when a `ScanConfig` is rejected.

use thiserror::Error;

/// Central error type for Legible operations.
///
/// Each variant represents an error from a specific subsystem, allowing
/// for clear error propagation across crate boundaries.
#[derive(Error, Debug)]
pub enum LegibleError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The document could not be built or queried
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Rule registration or execution errors
    #[error("rule error: {0}")]
    Rule(String),

    /// Validation errors (invalid identifiers, constraints)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
///
/// Invalid values are rejected rather than silently replaced by defaults.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using `LegibleError`.
pub type Result<T> = std::result::Result<T, LegibleError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LegibleError::Validation("bad rule id".to_string());
        assert_eq!(err.to_string(), "validation error: bad rule id");

        let err = ConfigError::invalid("chunk_token_budget", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid config value for chunk_token_budget: must be greater than zero"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NotFound {
            path: "/nowhere/legible.toml".to_string(),
        };
        let err: LegibleError = config_err.into();
        assert!(matches!(err, LegibleError::Config(_)));
    }
}
