//! Legible Scoring - Turning issue lists into scores, grades and diffs.
//!
//! # Example
//!
//! ```rust
//! use legible_core::{Category, Issue, ScanConfig, Severity};
//! use legible_scoring::{Grade, IssueScorer};
//! use std::collections::BTreeSet;
//!
//! let config = ScanConfig::default();
//! let issues = vec![Issue::builder("metadata.missing-title", Category::Metadata, Severity::High)
//!     .impact(15.0)
//!     .build()];
//! let evaluated = BTreeSet::from([Category::Metadata]);
//!
//! let result = IssueScorer::new(&config).score(&issues, &evaluated);
//! assert_eq!(result.overall_score, 85.0);
//! assert_eq!(result.grade, Grade::B);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod compare;
pub mod ranking;
pub mod scorer;
pub mod types;

// Re-export commonly used types
pub use compare::{compare_scans, CategoryChange, ScanComparison, ScanView};
pub use ranking::{sort_for_presentation, top_issues};
pub use scorer::IssueScorer;
pub use types::{CategoryScore, Grade, ScoringResult, MAX_SCORE};
