//! Legible Scanner - One-call page analysis.
//!
//! The [`ScanEngine`] ties the workspace together: it parses a page into a
//! snapshot, runs the selected checks under a deadline, scores the issues,
//! chunks the content and maps extractability, then returns a single
//! [`ScanResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use legible_core::ScanConfig;
//! use legible_scanner::ScanEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ScanEngine::new(ScanConfig::default())?;
//! let result = engine
//!     .scan("https://example.com", "<html><body><h1>Hi</h1></body></html>", Some(200))
//!     .await?;
//!
//! println!("{} ({})", result.scoring.overall_score, result.scoring.grade);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod engine;
pub mod error;
pub mod orchestrator;

// Re-export commonly used types
pub use engine::{ScanEngine, ScanResult, ScanStatus};
pub use error::{Result, ScanError};
pub use orchestrator::{RuleOrchestrator, RuleRunReport};
