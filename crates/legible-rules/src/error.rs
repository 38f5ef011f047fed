//! Error types for the rule subsystem.

use legible_core::RuleId;
use legible_document::DocumentError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building the rule catalog.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A rule with this ID is already registered
    #[error("duplicate rule: {rule_id} is already registered")]
    DuplicateRule {
        /// The conflicting rule ID
        rule_id: String,
    },

    /// Rule not found in the registry
    #[error("rule not found: {rule_id}")]
    NotFound {
        /// The rule ID that was not found
        rule_id: String,
    },

    /// Invalid rule descriptor (validation failed)
    #[error("invalid rule descriptor for {rule_id}: {reason}")]
    InvalidDescriptor {
        /// Rule ID being validated
        rule_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Invalid rule ID format
    #[error("invalid rule ID: {0}")]
    InvalidId(#[from] legible_core::LegibleError),
}

/// Why a single check produced no result.
///
/// Returned from [`Rule::execute`](crate::Rule::execute); the orchestrator
/// converts it into a [`RuleExecutionError`] and carries on.
#[derive(Error, Debug)]
pub enum CheckError {
    /// A document query failed
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The check gave up
    #[error("{0}")]
    Failed(String),

    /// The check's own I/O exceeded its timeout
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A recorded failure of one rule during a run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("rule {rule_id} failed: {message}")]
pub struct RuleExecutionError {
    /// The rule that failed
    pub rule_id: RuleId,
    /// What went wrong
    pub message: String,
}

impl From<RuleError> for legible_core::LegibleError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::InvalidId(e) => e,
            other => legible_core::LegibleError::Rule(other.to_string()),
        }
    }
}

/// Result type for rule catalog operations.
pub type Result<T> = std::result::Result<T, RuleError>;
