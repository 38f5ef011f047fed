//! Scan errors.

use legible_core::{ConfigError, LegibleError};
use legible_document::DocumentError;
use thiserror::Error;

/// Errors that stop a scan before any check runs.
///
/// Failures of individual checks and deadline expiry are not errors; they
/// are reported on the [`ScanResult`](crate::ScanResult).
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configuration was rejected
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The page could not be parsed or queried
    #[error("malformed input: {0}")]
    Document(#[from] DocumentError),
}

impl From<ScanError> for LegibleError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Config(e) => LegibleError::Config(e),
            ScanError::Document(e) => e.into(),
        }
    }
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
