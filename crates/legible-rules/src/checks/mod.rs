//! Built-in checks.
//!
//! Each submodule registers the checks for one category. The process-wide
//! catalog is built once on first use and is read-only afterwards.

mod accessibility;
mod content;
mod crawlability;
mod metadata;
mod readability;
mod structured;

use crate::error::Result;
use crate::registry::{RuleRegistry, RuleRegistryBuilder};
use std::sync::OnceLock;

pub use readability::{estimate_syllables, flesch_kincaid_grade, split_sentences};
pub use structured::{walk_jsonld, JsonLdSummary};

/// Register every built-in check on `builder`.
///
/// # Errors
/// Returns error if a built-in ID collides with one already registered.
pub fn register_builtin_checks(builder: &mut RuleRegistryBuilder) -> Result<()> {
    crawlability::register(builder)?;
    metadata::register(builder)?;
    content::register(builder)?;
    structured::register(builder)?;
    accessibility::register(builder)?;
    readability::register(builder)?;
    Ok(())
}

/// The frozen catalog of built-in checks.
pub fn builtin_registry() -> &'static RuleRegistry {
    static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut builder = RuleRegistryBuilder::new();
        register_builtin_checks(&mut builder).expect("built-in rule IDs are unique");
        builder.build()
    })
}
