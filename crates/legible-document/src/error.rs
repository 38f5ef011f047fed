//! Error types for building and querying document snapshots.

use legible_core::LegibleError;
use thiserror::Error;

/// Errors raised when a snapshot cannot be constructed or queried.
///
/// All of these are fatal to a scan and surface before any rule runs.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The raw markup was empty or whitespace only
    #[error("document markup is empty")]
    EmptyMarkup,

    /// The page URL could not be parsed
    #[error("invalid document URL '{url}': {reason}")]
    InvalidUrl {
        /// URL as supplied
        url: String,
        /// Parser message
        reason: String,
    },

    /// The page URL is not http(s)
    #[error("unsupported URL scheme '{scheme}', expected http or https")]
    UnsupportedScheme {
        /// Scheme as parsed
        scheme: String,
    },

    /// A query used an invalid CSS selector
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector as supplied
        selector: String,
        /// Parser message
        reason: String,
    },
}

impl From<DocumentError> for LegibleError {
    fn from(err: DocumentError) -> Self {
        LegibleError::MalformedInput(err.to_string())
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_legible_error() {
        let err: LegibleError = DocumentError::EmptyMarkup.into();
        assert!(matches!(err, LegibleError::MalformedInput(_)));
        assert_eq!(err.to_string(), "malformed input: document markup is empty");
    }
}
