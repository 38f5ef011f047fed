//! The check capability and the context a check runs against.

use crate::descriptor::RuleDescriptor;
use crate::error::CheckError;
use async_trait::async_trait;
use legible_core::{Issue, IssueBuilder, ScanConfig, Severity};
use legible_document::DocumentSnapshot;

/// What a check returns: zero or more issues, or the reason it failed.
pub type RuleOutput = std::result::Result<Vec<Issue>, CheckError>;

/// A single check over a document snapshot.
///
/// Checks are stateless across runs and must not mutate the snapshot.
/// Execution is polled on the scan's task, so futures do not need to be
/// `Send`; a check that needs I/O should await it rather than block.
#[async_trait(?Send)]
pub trait Rule: Send + Sync {
    /// Evaluate the document.
    async fn execute(&self, ctx: &RuleContext<'_>) -> RuleOutput;
}

/// Everything a check can see while it runs.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The page being analysed
    pub document: &'a DocumentSnapshot,
    /// The scan's configuration
    pub config: &'a ScanConfig,
    /// Descriptor of the running check
    pub descriptor: &'a RuleDescriptor,
}

impl<'a> RuleContext<'a> {
    /// Create a context.
    #[must_use]
    pub fn new(
        document: &'a DocumentSnapshot,
        config: &'a ScanConfig,
        descriptor: &'a RuleDescriptor,
    ) -> Self {
        Self {
            document,
            config,
            descriptor,
        }
    }

    /// Issue builder prefilled from the descriptor: id, title, category,
    /// default severity, tags and the configured impact for that severity.
    #[must_use]
    pub fn issue(&self) -> IssueBuilder {
        self.issue_with_severity(self.descriptor.default_severity)
    }

    /// Like [`issue`](Self::issue) with a different severity and its impact.
    #[must_use]
    pub fn issue_with_severity(&self, severity: Severity) -> IssueBuilder {
        Issue::builder(
            self.descriptor.id.as_str(),
            self.descriptor.category,
            severity,
        )
        .title(self.descriptor.title.clone())
        .impact(self.config.impact_for(severity))
        .tags(self.descriptor.tags.iter().cloned())
    }
}

/// A check backed by a plain synchronous function.
///
/// Most built-in checks are pure functions of the snapshot; this adapter
/// lets them register without a dedicated type.
#[derive(Clone, Copy)]
pub struct FnRule {
    check: fn(&RuleContext<'_>) -> RuleOutput,
}

impl FnRule {
    /// Wrap a function.
    #[must_use]
    pub fn new(check: fn(&RuleContext<'_>) -> RuleOutput) -> Self {
        Self { check }
    }
}

impl std::fmt::Debug for FnRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").finish_non_exhaustive()
    }
}

#[async_trait(?Send)]
impl Rule for FnRule {
    async fn execute(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        (self.check)(ctx)
    }
}
