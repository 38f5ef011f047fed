//! Legible Rules - Pluggable check catalog for page analysis.
//!
//! This crate defines what a check is and keeps the catalog of checks a scan
//! runs. Checks are registered explicitly on a [`RuleRegistryBuilder`] and
//! frozen into an immutable [`RuleRegistry`] before any scan starts.
//!
//! # Architecture
//!
//! - **Descriptors** ([`descriptor`]): Static metadata for each check
//! - **Rules** ([`rule`]): The `Rule` capability and the per-run `RuleContext`
//! - **Registry** ([`registry`]): Ordered, write-once catalog
//! - **Filters** ([`filter`]): Selecting a subset of the catalog for a scan
//! - **Checks** ([`checks`]): The built-in catalog
//! - **Errors** ([`error`]): Registration and execution errors
//!
//! # Example
//!
//! ```rust
//! use legible_rules::{builtin_registry, RuleFilter};
//! use legible_core::Category;
//!
//! let registry = builtin_registry();
//! let metadata_rules = registry.select(&RuleFilter::Category(Category::Metadata));
//! assert!(!metadata_rules.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod checks;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod registry;
pub mod rule;

// Re-export commonly used types
pub use checks::{builtin_registry, register_builtin_checks};
pub use descriptor::RuleDescriptor;
pub use error::{CheckError, Result, RuleError, RuleExecutionError};
pub use filter::RuleFilter;
pub use registry::{RegisteredRule, RuleRegistry, RuleRegistryBuilder};
pub use rule::{FnRule, Rule, RuleContext, RuleOutput};
