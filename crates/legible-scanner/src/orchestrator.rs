//! Rule orchestrator for running checks against one snapshot.
//!
//! Checks are polled concurrently from a `FuturesUnordered` set on the
//! calling task, at most `max_concurrent_rules` at a time. The snapshot is
//! parsed HTML and is not `Send`, so nothing is spawned; checks that await
//! I/O overlap, while synchronous checks simply run back to back.
//!
//! A check that returns an error or panics is recorded and contributes no
//! issues. When the deadline passes, checks still outstanding are abandoned
//! and listed in the report.

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use legible_core::{Category, Issue, RuleId, ScanConfig};
use legible_document::DocumentSnapshot;
use legible_rules::{
    CheckError, RegisteredRule, RuleContext, RuleExecutionError, RuleFilter, RuleRegistry,
};
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What one run of the checks produced.
#[derive(Debug, Clone, Default)]
pub struct RuleRunReport {
    /// Issues from every check that finished, in completion order
    pub issues: Vec<Issue>,
    /// Checks that finished, successfully or not, in catalog order
    pub executed_rules: Vec<RuleId>,
    /// Categories with at least one successfully finished check
    pub evaluated_categories: BTreeSet<Category>,
    /// Checks that failed or panicked
    pub errors: Vec<RuleExecutionError>,
    /// Checks abandoned at the deadline, in catalog order
    pub timed_out_rules: Vec<RuleId>,
    /// Whether the deadline cut the run short
    pub incomplete: bool,
}

/// Runs the selected checks of a registry.
#[derive(Debug, Clone)]
pub struct RuleOrchestrator {
    /// Catalog of checks
    registry: RuleRegistry,
    /// Which checks to run
    filter: RuleFilter,
    /// Overrides the configured concurrency when set
    max_concurrent_rules: Option<usize>,
}

/// How one check ended.
struct RuleOutcome {
    position: usize,
    result: Result<Vec<Issue>, String>,
}

impl RuleOrchestrator {
    /// Create an orchestrator that runs every check in `registry`.
    #[must_use]
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry,
            filter: RuleFilter::All,
            max_concurrent_rules: None,
        }
    }

    /// Run only the checks matching `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: RuleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the maximum number of checks polled at once.
    #[must_use]
    pub fn with_max_concurrent_rules(mut self, max: usize) -> Self {
        self.max_concurrent_rules = Some(max);
        self
    }

    /// The catalog this orchestrator runs.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run the checks with the configured overall timeout.
    pub async fn run(&self, document: &DocumentSnapshot, config: &ScanConfig) -> RuleRunReport {
        let deadline = Instant::now() + config.overall_timeout();
        self.run_until(document, config, deadline).await
    }

    /// Run the checks, abandoning any still outstanding at `deadline`.
    pub async fn run_until(
        &self,
        document: &DocumentSnapshot,
        config: &ScanConfig,
        deadline: Instant,
    ) -> RuleRunReport {
        let selected = self.registry.select(&self.filter);
        let limit = self
            .max_concurrent_rules
            .unwrap_or_else(|| config.effective_concurrency())
            .max(1);

        debug!(
            rules = selected.len(),
            concurrency = limit,
            "starting rule run"
        );

        let mut report = RuleRunReport::default();
        let mut finished = vec![false; selected.len()];
        let mut succeeded = vec![false; selected.len()];
        let mut pending = selected.iter().copied().enumerate();
        let mut running = FuturesUnordered::new();

        let sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            // Respect concurrency limit
            while running.len() < limit {
                match pending.next() {
                    Some((position, entry)) => {
                        running.push(execute_rule(position, entry, document, config));
                    }
                    None => break,
                }
            }
            if running.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                Some(outcome) = running.next() => {
                    let entry = selected[outcome.position];
                    finished[outcome.position] = true;
                    match outcome.result {
                        Ok(issues) => {
                            debug!(
                                rule_id = %entry.descriptor().id,
                                issues = issues.len(),
                                "rule finished"
                            );
                            succeeded[outcome.position] = true;
                            report.issues.extend(issues);
                        }
                        Err(message) => {
                            warn!(
                                rule_id = %entry.descriptor().id,
                                error = %message,
                                "rule failed"
                            );
                            report.errors.push(RuleExecutionError {
                                rule_id: entry.descriptor().id.clone(),
                                message,
                            });
                        }
                    }
                }
                () = &mut sleep => {
                    report.incomplete = true;
                    break;
                }
            }
        }

        for (position, entry) in selected.iter().enumerate() {
            let id = entry.descriptor().id.clone();
            if finished[position] {
                report.executed_rules.push(id);
                if succeeded[position] {
                    report
                        .evaluated_categories
                        .insert(entry.descriptor().category);
                }
            } else {
                report.timed_out_rules.push(id);
            }
        }

        if report.incomplete {
            warn!(
                timed_out = report.timed_out_rules.len(),
                finished = report.executed_rules.len(),
                "deadline reached before all rules finished"
            );
        }

        report
    }
}

async fn execute_rule(
    position: usize,
    entry: &RegisteredRule,
    document: &DocumentSnapshot,
    config: &ScanConfig,
) -> RuleOutcome {
    let ctx = RuleContext::new(document, config, entry.descriptor());
    let result = match AssertUnwindSafe(entry.rule().execute(&ctx))
        .catch_unwind()
        .await
    {
        Ok(Ok(issues)) => Ok(issues),
        Ok(Err(CheckError::Document(e))) => Err(format!("document query failed: {e}")),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    };
    RuleOutcome { position, result }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legible_core::Severity;
    use legible_rules::{RuleDescriptor, RuleOutput, RuleRegistryBuilder};

    fn one_issue(ctx: &RuleContext<'_>) -> RuleOutput {
        Ok(vec![ctx.issue().build()])
    }

    fn nothing(_ctx: &RuleContext<'_>) -> RuleOutput {
        Ok(Vec::new())
    }

    fn fails(_ctx: &RuleContext<'_>) -> RuleOutput {
        Err(CheckError::Failed("broken".into()))
    }

    fn bad_selector(ctx: &RuleContext<'_>) -> RuleOutput {
        ctx.document.select("div[")?;
        Ok(Vec::new())
    }

    fn registry(rules: &[(&str, Category, fn(&RuleContext<'_>) -> RuleOutput)]) -> RuleRegistry {
        let mut builder = RuleRegistryBuilder::new();
        for (id, category, check) in rules {
            let descriptor = RuleDescriptor::new(id, "Test", *category, Severity::Medium)
                .expect("valid descriptor");
            builder.register_fn(descriptor, *check).expect("register");
        }
        builder.build()
    }

    fn document() -> DocumentSnapshot {
        DocumentSnapshot::parse("https://example.com", "<html><body><p>x</p></body></html>", None)
            .expect("parse")
    }

    #[tokio::test]
    async fn test_run_collects_issues_and_errors() {
        let registry = registry(&[
            ("metadata.one", Category::Metadata, one_issue),
            ("metadata.fails", Category::Metadata, fails),
            ("readability.none", Category::Readability, nothing),
            ("crawlability.selector", Category::Crawlability, bad_selector),
        ]);
        let report = RuleOrchestrator::new(registry)
            .run(&document(), &ScanConfig::default())
            .await;

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.executed_rules.len(), 4);
        assert_eq!(report.errors.len(), 2);
        assert!(!report.incomplete);
        assert!(report.timed_out_rules.is_empty());

        let failed: Vec<&str> = report.errors.iter().map(|e| e.rule_id.as_str()).collect();
        assert!(failed.contains(&"metadata.fails"));
        assert!(failed.contains(&"crawlability.selector"));

        let categories: Vec<Category> = report.evaluated_categories.into_iter().collect();
        assert_eq!(categories, vec![Category::Metadata, Category::Readability]);
    }

    #[tokio::test]
    async fn test_filter_limits_run() {
        let registry = registry(&[
            ("metadata.one", Category::Metadata, one_issue),
            ("readability.one", Category::Readability, one_issue),
        ]);
        let report = RuleOrchestrator::new(registry)
            .with_filter(RuleFilter::Category(Category::Readability))
            .with_max_concurrent_rules(1)
            .run(&document(), &ScanConfig::default())
            .await;

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].id, "readability.one");
        assert_eq!(report.executed_rules.len(), 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
