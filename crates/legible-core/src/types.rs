//! Shared types used across Legible.
//!
//! Severities and categories are closed enumerations; everything that
//! crosses a crate boundary (issues, rule identifiers) is defined here.

use crate::error::LegibleError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Upper bound for a single issue's impact score.
pub const MAX_IMPACT_SCORE: f64 = 50.0;

/// Qualitative urgency of an issue.
///
/// The declaration order is the presentation order: `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks agents from using the page at all
    Critical,
    /// Severely degrades discoverability or understanding
    High,
    /// Noticeable degradation
    Medium,
    /// Minor polish
    Low,
    /// Informational, carries no deduction by default
    Info,
}

impl Severity {
    /// All severities in presentation order.
    pub const ALL: [Severity; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Info,
    ];

    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }

    /// Built-in impact deduction for this severity.
    ///
    /// Used when a scan configuration does not list the severity.
    #[must_use]
    pub fn default_impact(&self) -> f64 {
        match self {
            Self::Critical => 25.0,
            Self::High => 15.0,
            Self::Medium => 8.0,
            Self::Low => 3.0,
            Self::Info => 0.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of related issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// JSON-LD, microdata and other machine-readable annotations
    StructuredData,
    /// Title, description, language and canonical metadata
    Metadata,
    /// Headings, semantic containers and content volume
    ContentStructure,
    /// Alternative text and other assistive affordances
    Accessibility,
    /// Indexing directives and fetch status
    Crawlability,
    /// Sentence length and reading level
    Readability,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 6] = [
        Self::StructuredData,
        Self::Metadata,
        Self::ContentStructure,
        Self::Accessibility,
        Self::Crawlability,
        Self::Readability,
    ];

    /// Kebab-case identifier, also the prefix of rule ids in this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredData => "structured-data",
            Self::Metadata => "metadata",
            Self::ContentStructure => "content-structure",
            Self::Accessibility => "accessibility",
            Self::Crawlability => "crawlability",
            Self::Readability => "readability",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::StructuredData => "Structured Data",
            Self::Metadata => "Metadata",
            Self::ContentStructure => "Content Structure",
            Self::Accessibility => "Accessibility",
            Self::Crawlability => "Crawlability",
            Self::Readability => "Readability",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Newtype for rule identifiers with validation.
///
/// Rule IDs are lowercase dotted slugs such as `metadata.missing-title`,
/// 3-80 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(String);

impl RuleId {
    /// Create a new `RuleId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, LegibleError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), LegibleError> {
        static RULE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = RULE_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z][a-z0-9-]*(\.[a-z0-9][a-z0-9-]*)+$").expect("valid regex")
        });

        if id.len() < 3 || id.len() > 80 {
            return Err(LegibleError::Validation(format!(
                "invalid rule ID: must be 3-80 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(LegibleError::Validation(format!(
                "invalid rule ID: must be a lowercase dotted slug, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One detected problem.
///
/// Issues are immutable once built; use [`Issue::builder`] to create them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable identifier; two issues with the same id are the same finding
    pub id: String,
    /// Short headline
    pub title: String,
    /// Urgency
    pub severity: Severity,
    /// Category the issue is scored under
    pub category: Category,
    /// What was detected
    pub description: String,
    /// How to fix it
    pub remediation: String,
    /// Deduction applied to the category score, within `[0, 50]`
    pub impact_score: f64,
    /// Selector or region the issue points at
    pub location: Option<String>,
    /// Snippets supporting the finding
    pub evidence: Vec<String>,
    /// Free-form labels
    pub tags: Vec<String>,
    /// Detector confidence, within `[0, 1]`
    pub confidence: f64,
    /// When the issue was produced
    pub timestamp: DateTime<Utc>,
}

impl Issue {
    /// Start building an issue.
    #[must_use]
    pub fn builder(id: impl Into<String>, category: Category, severity: Severity) -> IssueBuilder {
        IssueBuilder::new(id, category, severity)
    }
}

/// Builder for [`Issue`].
///
/// Out-of-range impact and confidence values are clamped on [`build`](Self::build).
#[derive(Debug, Clone)]
#[must_use]
pub struct IssueBuilder {
    id: String,
    title: String,
    severity: Severity,
    category: Category,
    description: String,
    remediation: String,
    impact_score: f64,
    location: Option<String>,
    evidence: Vec<String>,
    tags: Vec<String>,
    confidence: f64,
}

impl IssueBuilder {
    fn new(id: impl Into<String>, category: Category, severity: Severity) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            severity,
            category,
            description: String::new(),
            remediation: String::new(),
            impact_score: severity.default_impact(),
            location: None,
            evidence: Vec::new(),
            tags: Vec::new(),
            confidence: 1.0,
        }
    }

    /// Replace the identifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the headline.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the severity. The impact score is left untouched.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the remediation advice.
    pub fn remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Set the impact score.
    pub fn impact(mut self, impact_score: f64) -> Self {
        self.impact_score = impact_score;
        self
    }

    /// Point the issue at a selector or region.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Append one evidence snippet.
    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    /// Append one tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append several tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the confidence.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Finish the issue, clamping impact to `[0, 50]` and confidence to `[0, 1]`.
    #[must_use]
    pub fn build(self) -> Issue {
        Issue {
            id: self.id,
            title: self.title,
            severity: self.severity,
            category: self.category,
            description: self.description,
            remediation: self.remediation,
            impact_score: clamp_or_zero(self.impact_score, 0.0, MAX_IMPACT_SCORE),
            location: self.location,
            evidence: self.evidence,
            tags: self.tags,
            confidence: clamp_or_zero(self.confidence, 0.0, 1.0),
            timestamp: Utc::now(),
        }
    }
}

fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_valid() {
        assert!(RuleId::new("metadata.missing-title").is_ok());
        assert!(RuleId::new("structured-data.jsonld.invalid").is_ok());
    }

    #[test]
    fn test_rule_id_invalid() {
        assert!(RuleId::new("ab").is_err());
        assert!(RuleId::new("Metadata.Title").is_err());
        assert!(RuleId::new("no-dots-here").is_err());
        assert!(RuleId::new("metadata..title").is_err());
        assert!(RuleId::new("a".repeat(81)).is_err());
    }

    #[test]
    fn test_severity_order_is_presentation_order() {
        let mut severities = vec![
            Severity::Info,
            Severity::Low,
            Severity::Critical,
            Severity::High,
        ];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::High, Severity::Low, Severity::Info]
        );
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Critical).expect("serialize severity");
        assert_eq!(json, "\"critical\"");

        let parsed: Category =
            serde_json::from_str("\"structured-data\"").expect("deserialize category");
        assert_eq!(parsed, Category::StructuredData);
    }

    #[test]
    fn test_builder_clamps_ranges() {
        let issue = Issue::builder("metadata.missing-title", Category::Metadata, Severity::High)
            .title("Missing title")
            .impact(120.0)
            .confidence(1.7)
            .build();
        assert!((issue.impact_score - MAX_IMPACT_SCORE).abs() < f64::EPSILON);
        assert!((issue.confidence - 1.0).abs() < f64::EPSILON);

        let issue = Issue::builder("metadata.missing-title", Category::Metadata, Severity::High)
            .impact(-3.0)
            .confidence(f64::NAN)
            .build();
        assert!(issue.impact_score.abs() < f64::EPSILON);
        assert!(issue.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_defaults_impact_from_severity() {
        let issue = Issue::builder(
            "crawlability.noindex",
            Category::Crawlability,
            Severity::Critical,
        )
        .tag("indexing")
        .tags(["robots", "meta"])
        .evidence("<meta name=\"robots\" content=\"noindex\">")
        .build();
        assert!((issue.impact_score - 25.0).abs() < f64::EPSILON);
        assert_eq!(issue.tags, vec!["indexing", "robots", "meta"]);
        assert_eq!(issue.evidence.len(), 1);
        assert!(issue.location.is_none());
    }
}
