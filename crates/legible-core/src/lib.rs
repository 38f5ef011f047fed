//! Legible Core - Foundation crate for the Legible page-analysis pipeline.
//!
//! This crate provides shared types, error handling and scan configuration
//! that every other Legible crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based, explicitly passed scan configuration
//! - [`types`] - Shared enums and records (`Severity`, `Category`, `Issue`, `RuleId`)
//!
//! # Example
//!
//! ```rust
//! use legible_core::{Category, ScanConfig, Severity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! config.validate()?;
//!
//! assert!(config.weight_for(Category::Crawlability) > 0.0);
//! assert!(config.impact_for(Severity::Critical) > config.impact_for(Severity::Low));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ExtractabilityConfig, RuleThresholds, ScanConfig};
pub use error::{ConfigError, ConfigResult, LegibleError, Result};
pub use types::{Category, Issue, IssueBuilder, RuleId, Severity, MAX_IMPACT_SCORE};
