//! Scan engine that assembles the full result for one page.

use crate::error::Result;
use crate::orchestrator::{RuleOrchestrator, RuleRunReport};
use chrono::{DateTime, Utc};
use legible_content::{ChunkingResult, ContentChunker, ExtractabilityMap, ExtractabilityMapper};
use legible_core::{Issue, RuleId, ScanConfig};
use legible_document::DocumentSnapshot;
use legible_rules::{builtin_registry, RuleExecutionError, RuleFilter, RuleRegistry};
use legible_scoring::{sort_for_presentation, top_issues, IssueScorer, ScanView, ScoringResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Whether every selected check finished before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// All selected checks finished
    Complete,
    /// The deadline expired with checks outstanding
    Partial,
}

/// Everything a scan produced for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique identifier for this scan
    pub scan_id: Uuid,
    /// URL of the scanned page
    pub url: String,
    /// When the scan finished
    pub scanned_at: DateTime<Utc>,
    /// Complete or partial
    pub status: ScanStatus,
    /// Issues sorted by category, severity and impact
    pub issues: Vec<Issue>,
    /// Scores computed from `issues`
    pub scoring: ScoringResult,
    /// Token-bounded chunks of the page content
    pub chunking: ChunkingResult,
    /// Static versus client-rendered content
    pub extractability: ExtractabilityMap,
    /// Checks that failed or panicked
    pub rule_errors: Vec<RuleExecutionError>,
    /// Checks abandoned at the deadline
    pub timed_out_rules: Vec<RuleId>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl ScanResult {
    /// Borrow the parts needed by `legible_scoring::compare_scans`.
    #[must_use]
    pub fn view(&self) -> ScanView<'_> {
        ScanView {
            scoring: &self.scoring,
            issues: &self.issues,
        }
    }

    /// The `n` most severe issues.
    #[must_use]
    pub fn top_issues(&self, n: usize) -> Vec<&Issue> {
        top_issues(&self.issues, n)
    }

    /// Whether the deadline cut the scan short.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status == ScanStatus::Partial
    }
}

/// Runs checks, scoring, chunking and extractability mapping for a page.
#[derive(Debug, Clone)]
pub struct ScanEngine {
    config: ScanConfig,
    orchestrator: RuleOrchestrator,
}

impl ScanEngine {
    /// Create an engine over the built-in checks.
    ///
    /// # Errors
    /// Returns error if the configuration does not validate.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_registry(config, builtin_registry().clone())
    }

    /// Create an engine over a custom registry.
    pub fn with_registry(config: ScanConfig, registry: RuleRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            orchestrator: RuleOrchestrator::new(registry),
        })
    }

    /// Run only the checks matching `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: RuleFilter) -> Self {
        self.orchestrator = self.orchestrator.with_filter(filter);
        self
    }

    /// The configuration every scan uses.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Parse `raw_html` and scan it.
    ///
    /// # Errors
    /// Returns [`ScanError::Document`](crate::ScanError::Document) if the
    /// markup is empty or the URL is not http(s). No check runs in that case.
    pub async fn scan(
        &self,
        url: &str,
        raw_html: impl Into<String>,
        http_status: Option<u16>,
    ) -> Result<ScanResult> {
        let document = DocumentSnapshot::parse(url, raw_html, http_status)?;
        self.scan_document(&document).await
    }

    /// Scan an already parsed snapshot.
    pub async fn scan_document(&self, document: &DocumentSnapshot) -> Result<ScanResult> {
        let started = Instant::now();
        debug!(url = %document.url(), "scan started");

        let RuleRunReport {
            mut issues,
            evaluated_categories,
            errors,
            timed_out_rules,
            incomplete,
            ..
        } = self.orchestrator.run(document, &self.config).await;

        let scoring = IssueScorer::new(&self.config).score(&issues, &evaluated_categories);
        let chunking = ContentChunker::from_config(&self.config).chunk(document);
        let extractability = ExtractabilityMapper::from_config(&self.config).map(document)?;

        sort_for_presentation(&mut issues);

        let status = if incomplete {
            ScanStatus::Partial
        } else {
            ScanStatus::Complete
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            url = %document.url(),
            score = scoring.overall_score,
            grade = %scoring.grade,
            issues = issues.len(),
            rule_errors = errors.len(),
            timed_out = timed_out_rules.len(),
            chunks = chunking.total_chunks,
            duration_ms,
            "scan complete"
        );

        Ok(ScanResult {
            scan_id: Uuid::new_v4(),
            url: document.url().to_string(),
            scanned_at: Utc::now(),
            status,
            issues,
            scoring,
            chunking,
            extractability,
            rule_errors: errors,
            timed_out_rules,
            duration_ms,
        })
    }
}
