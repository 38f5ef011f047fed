//! Issue ordering for reports.

use legible_core::Issue;
use std::cmp::Ordering;

/// The `n` most urgent issues: severity first, then impact descending.
#[must_use]
pub fn top_issues(issues: &[Issue], n: usize) -> Vec<&Issue> {
    let mut ranked: Vec<&Issue> = issues.iter().collect();
    ranked.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| by_impact_desc(a, b))
    });
    ranked.truncate(n);
    ranked
}

/// Stable report order: category, severity, impact descending, then id.
///
/// Rules may finish in any order, so callers sort before presenting.
pub fn sort_for_presentation(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.severity.cmp(&b.severity))
            .then_with(|| by_impact_desc(a, b))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn by_impact_desc(a: &Issue, b: &Issue) -> Ordering {
    b.impact_score.total_cmp(&a.impact_score)
}
