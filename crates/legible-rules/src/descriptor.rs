//! Static metadata describing one check.

use crate::error::{Result, RuleError};
use legible_core::{Category, RuleId, Severity};
use serde::{Deserialize, Serialize};

/// Everything the registry and the reports need to know about a check
/// without running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Unique identifier, also the default issue id
    pub id: RuleId,
    /// Short human-readable title
    pub title: String,
    /// Category the check's issues belong to
    pub category: Category,
    /// Severity used unless the check chooses another
    pub default_severity: Severity,
    /// Free-form tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lower runs earlier; ties keep registration order
    #[serde(default)]
    pub priority: i32,
    /// Longer explanation of what is checked
    #[serde(default)]
    pub description: String,
}

impl RuleDescriptor {
    /// Create a descriptor with no tags, priority 0 and an empty description.
    ///
    /// # Errors
    /// Returns error if `id` is not a valid rule ID.
    pub fn new(
        id: &str,
        title: impl Into<String>,
        category: Category,
        default_severity: Severity,
    ) -> Result<Self> {
        Ok(Self {
            id: RuleId::new(id)?,
            title: title.into(),
            category,
            default_severity,
            tags: Vec::new(),
            priority: 0,
            description: String::new(),
        })
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether the descriptor carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Validate the descriptor.
    ///
    /// # Errors
    /// Returns error if the title is empty or a tag is blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(self.invalid("title cannot be empty"));
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(self.invalid("tags cannot be blank"));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> RuleError {
        RuleError::InvalidDescriptor {
            rule_id: self.id.to_string(),
            reason: reason.to_string(),
        }
    }
}
