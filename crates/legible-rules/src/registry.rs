//! Write-once catalog of checks.
//!
//! Checks are added to a [`RuleRegistryBuilder`] during startup. Calling
//! [`RuleRegistryBuilder::build`] freezes the catalog into a [`RuleRegistry`]
//! that is cheap to clone and safe to share across scans.

use crate::{
    descriptor::RuleDescriptor,
    error::{Result, RuleError},
    filter::RuleFilter,
    rule::{FnRule, Rule, RuleContext, RuleOutput},
};
use legible_core::Category;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// A check together with its descriptor.
#[derive(Clone)]
pub struct RegisteredRule {
    descriptor: RuleDescriptor,
    rule: Arc<dyn Rule>,
    sequence: usize,
}

impl RegisteredRule {
    /// The check's descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    /// The check itself.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// Shorthand for the descriptor's ID.
    #[must_use]
    pub fn id(&self) -> &str {
        self.descriptor.id.as_str()
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("id", &self.descriptor.id)
            .field("priority", &self.descriptor.priority)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// Mutable catalog used during startup.
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    rules: Vec<RegisteredRule>,
    next_sequence: usize,
}

impl RuleRegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check built by `factory`.
    ///
    /// The catalog stays ordered by ascending priority, then registration
    /// order.
    ///
    /// # Errors
    /// Returns error if the descriptor is invalid or its ID is already taken.
    pub fn register<F, R>(&mut self, descriptor: RuleDescriptor, factory: F) -> Result<&mut Self>
    where
        F: FnOnce() -> R,
        R: Rule + 'static,
    {
        descriptor.validate()?;
        if self.contains(descriptor.id.as_str()) {
            return Err(RuleError::DuplicateRule {
                rule_id: descriptor.id.to_string(),
            });
        }

        debug!(
            rule_id = %descriptor.id,
            category = %descriptor.category,
            priority = descriptor.priority,
            "registered rule"
        );

        self.rules.push(RegisteredRule {
            descriptor,
            rule: Arc::new(factory()),
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.rules
            .sort_by_key(|entry| (entry.descriptor.priority, entry.sequence));

        Ok(self)
    }

    /// Register a synchronous function as a check.
    ///
    /// # Errors
    /// Returns error if the descriptor is invalid or its ID is already taken.
    pub fn register_fn(
        &mut self,
        descriptor: RuleDescriptor,
        check: fn(&RuleContext<'_>) -> RuleOutput,
    ) -> Result<&mut Self> {
        self.register(descriptor, move || FnRule::new(check))
    }

    /// Whether a check with this ID is registered.
    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|entry| entry.id() == rule_id)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether nothing is registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze the catalog.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        info!(count = self.rules.len(), "rule registry frozen");
        RuleRegistry {
            rules: Arc::from(self.rules),
        }
    }
}

/// Immutable, ordered catalog of checks.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Arc<[RegisteredRule]>,
}

impl RuleRegistry {
    /// Every check in execution order.
    #[must_use]
    pub fn list(&self) -> &[RegisteredRule] {
        &self.rules
    }

    /// Get a check by ID.
    ///
    /// # Errors
    /// Returns error if the check is not registered.
    pub fn get(&self, rule_id: &str) -> Result<&RegisteredRule> {
        self.rules
            .iter()
            .find(|entry| entry.id() == rule_id)
            .ok_or_else(|| RuleError::NotFound {
                rule_id: rule_id.to_string(),
            })
    }

    /// Whether a check with this ID is registered.
    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|entry| entry.id() == rule_id)
    }

    /// Number of checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks in one category, in execution order.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&RegisteredRule> {
        self.select(&RuleFilter::Category(category))
    }

    /// Checks passing a filter, in execution order.
    #[must_use]
    pub fn select(&self, filter: &RuleFilter) -> Vec<&RegisteredRule> {
        self.rules
            .iter()
            .filter(|entry| filter.matches(&entry.descriptor))
            .collect()
    }

    /// Count checks by category.
    #[must_use]
    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.rules.iter() {
            *counts.entry(entry.descriptor.category).or_insert(0) += 1;
        }
        counts
    }

    /// Categories with at least one check.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<Category> {
        self.rules
            .iter()
            .map(|entry| entry.descriptor.category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legible_core::Severity;

    fn noop(_ctx: &RuleContext<'_>) -> RuleOutput {
        Ok(Vec::new())
    }

    fn descriptor(id: &str, category: Category, priority: i32) -> RuleDescriptor {
        RuleDescriptor::new(id, "Test rule", category, Severity::Low)
            .expect("valid descriptor")
            .with_priority(priority)
    }

    #[test]
    fn test_register_orders_by_priority_then_sequence() {
        let mut builder = RuleRegistryBuilder::new();
        builder
            .register_fn(descriptor("test.late", Category::Metadata, 10), noop)
            .expect("register")
            .register_fn(descriptor("test.early", Category::Metadata, -1), noop)
            .expect("register")
            .register_fn(descriptor("test.tie-a", Category::Readability, 0), noop)
            .expect("register")
            .register_fn(descriptor("test.tie-b", Category::Readability, 0), noop)
            .expect("register");

        let registry = builder.build();
        let ids: Vec<&str> = registry.list().iter().map(RegisteredRule::id).collect();
        assert_eq!(ids, vec!["test.early", "test.tie-a", "test.tie-b", "test.late"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut builder = RuleRegistryBuilder::new();
        builder
            .register_fn(descriptor("test.one", Category::Metadata, 0), noop)
            .expect("register");

        let result = builder.register_fn(descriptor("test.one", Category::Accessibility, 5), noop);
        assert!(matches!(result, Err(RuleError::DuplicateRule { .. })));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let mut builder = RuleRegistryBuilder::new();
        let mut bad = descriptor("test.bad", Category::Metadata, 0);
        bad.title = String::new();

        let result = builder.register_fn(bad, noop);
        assert!(matches!(result, Err(RuleError::InvalidDescriptor { .. })));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_queries() {
        let mut builder = RuleRegistryBuilder::new();
        builder
            .register_fn(descriptor("test.a", Category::Metadata, 0), noop)
            .expect("register")
            .register_fn(descriptor("test.b", Category::Metadata, 0), noop)
            .expect("register")
            .register_fn(descriptor("test.c", Category::Crawlability, 0), noop)
            .expect("register");
        let registry = builder.build();

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("test.c"));
        assert!(registry.get("test.a").is_ok());
        assert!(matches!(
            registry.get("test.missing"),
            Err(RuleError::NotFound { .. })
        ));
        assert_eq!(registry.by_category(Category::Metadata).len(), 2);

        let counts = registry.count_by_category();
        assert_eq!(counts.get(&Category::Metadata), Some(&2));
        assert_eq!(counts.get(&Category::Crawlability), Some(&1));
        assert_eq!(counts.get(&Category::Readability), None);

        let categories: Vec<Category> = registry.categories().into_iter().collect();
        assert_eq!(categories, vec![Category::Metadata, Category::Crawlability]);
    }

    #[test]
    fn test_clone_shares_catalog() {
        let mut builder = RuleRegistryBuilder::new();
        builder
            .register_fn(descriptor("test.a", Category::Metadata, 0), noop)
            .expect("register");
        let registry = builder.build();
        let cloned = registry.clone();
        assert!(std::ptr::eq(registry.list(), cloned.list()));
    }
}
