//! Selecting which checks a scan runs.

use crate::descriptor::RuleDescriptor;
use legible_core::Category;
use serde::{Deserialize, Serialize};

/// Subset of the catalog to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum RuleFilter {
    /// Every registered check
    #[default]
    All,
    /// Checks in one category
    Category(Category),
    /// Checks carrying a tag
    Tag(String),
    /// Checks with one of these IDs
    Specific(Vec<String>),
}

impl RuleFilter {
    /// Whether a check passes the filter.
    #[must_use]
    pub fn matches(&self, descriptor: &RuleDescriptor) -> bool {
        match self {
            RuleFilter::All => true,
            RuleFilter::Category(category) => descriptor.category == *category,
            RuleFilter::Tag(tag) => descriptor.has_tag(tag),
            RuleFilter::Specific(ids) => ids.iter().any(|id| descriptor.id.as_str() == id),
        }
    }
}
