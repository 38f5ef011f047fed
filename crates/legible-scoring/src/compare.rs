//! Diffing two scans of the same page.

use crate::types::ScoringResult;
use legible_core::{Category, Issue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The parts of a scan that comparison needs.
#[derive(Debug, Clone, Copy)]
pub struct ScanView<'a> {
    /// Aggregate scores
    pub scoring: &'a ScoringResult,
    /// Every issue found
    pub issues: &'a [Issue],
}

/// Score movement of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    /// The category
    pub category: Category,
    /// Score in the earlier scan
    pub before: f64,
    /// Score in the later scan
    pub after: f64,
    /// `after - before`
    pub delta: f64,
}

/// Difference between two scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanComparison {
    /// `after.overall_score - before.overall_score`
    pub score_change: f64,
    /// `"No change"` or `"<before> → <after>"`
    pub grade_change: String,
    /// `after.total_issues - before.total_issues`
    pub issue_change: i64,
    /// Non-zero category deltas, largest improvement first
    pub category_changes: Vec<CategoryChange>,
    /// Issues in `after` whose id is absent from `before`
    pub new_issues: Vec<Issue>,
    /// Issues in `before` whose id is absent from `after`
    pub resolved_issues: Vec<Issue>,
}

/// Compare two scans.
///
/// Issues are matched by id only. Categories are compared when both scans
/// scored them.
#[must_use]
pub fn compare_scans(before: ScanView<'_>, after: ScanView<'_>) -> ScanComparison {
    let grade_change = if before.scoring.grade == after.scoring.grade {
        "No change".to_string()
    } else {
        format!("{} → {}", before.scoring.grade, after.scoring.grade)
    };

    let mut category_changes: Vec<CategoryChange> = after
        .scoring
        .category_scores
        .iter()
        .filter_map(|after_score| {
            let before_score = before.scoring.category(after_score.category)?;
            let delta = after_score.score - before_score.score;
            (delta != 0.0).then_some(CategoryChange {
                category: after_score.category,
                before: before_score.score,
                after: after_score.score,
                delta,
            })
        })
        .collect();
    category_changes.sort_by(|a, b| b.delta.total_cmp(&a.delta));

    ScanComparison {
        score_change: after.scoring.overall_score - before.scoring.overall_score,
        grade_change,
        issue_change: signed(after.scoring.total_issues) - signed(before.scoring.total_issues),
        category_changes,
        new_issues: unmatched(after.issues, before.issues),
        resolved_issues: unmatched(before.issues, after.issues),
    }
}

/// Issues in `from` whose id never appears in `against`.
fn unmatched(from: &[Issue], against: &[Issue]) -> Vec<Issue> {
    let known: HashSet<&str> = against.iter().map(|issue| issue.id.as_str()).collect();
    from.iter()
        .filter(|issue| !known.contains(issue.id.as_str()))
        .cloned()
        .collect()
}

fn signed(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
