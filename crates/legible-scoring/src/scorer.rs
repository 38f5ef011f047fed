//! Per-category and overall scoring.

use crate::types::{empty_buckets, CategoryScore, Grade, ScoringResult, MAX_SCORE};
use legible_core::{Category, Issue, ScanConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Scores issue lists with the weights from one configuration.
#[derive(Debug, Clone)]
pub struct IssueScorer {
    weights: BTreeMap<Category, f64>,
}

impl IssueScorer {
    /// Create a scorer using `config`'s category weights.
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        let weights = Category::ALL
            .iter()
            .map(|category| (*category, config.weight_for(*category)))
            .collect();
        Self { weights }
    }

    /// Score `issues`.
    ///
    /// `evaluated` lists the categories whose checks ran. Those categories,
    /// plus any category that produced an issue, make up the run; only they
    /// count toward the overall average. With no categories in the run the
    /// overall score is 100.
    #[must_use]
    pub fn score(&self, issues: &[Issue], evaluated: &BTreeSet<Category>) -> ScoringResult {
        let mut by_category: BTreeMap<Category, Vec<&Issue>> = evaluated
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();
        for issue in issues {
            by_category.entry(issue.category).or_default().push(issue);
        }

        let category_scores: Vec<CategoryScore> = by_category
            .into_iter()
            .map(|(category, issues)| self.score_category(category, &issues))
            .collect();

        let mut severity_breakdown = empty_buckets();
        for issue in issues {
            *severity_breakdown.entry(issue.severity).or_insert(0) += 1;
        }

        let overall_score = overall(&category_scores);
        debug!(
            overall_score,
            categories = category_scores.len(),
            total_issues = issues.len(),
            "scored issues"
        );

        ScoringResult {
            overall_score,
            grade: Grade::from_score(overall_score),
            category_scores,
            total_issues: issues.len(),
            severity_breakdown,
            max_possible_score: MAX_SCORE,
            normalized_score: overall_score / MAX_SCORE,
        }
    }

    fn score_category(&self, category: Category, issues: &[&Issue]) -> CategoryScore {
        let total_impact: f64 = issues.iter().map(|issue| issue.impact_score).sum();
        let mut severity_buckets = empty_buckets();
        for issue in issues {
            *severity_buckets.entry(issue.severity).or_insert(0) += 1;
        }

        CategoryScore {
            category,
            score: (MAX_SCORE - total_impact).clamp(0.0, MAX_SCORE),
            issue_count: issues.len(),
            total_impact,
            weight: self.weights.get(&category).copied().unwrap_or(1.0),
            severity_buckets,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn overall(category_scores: &[CategoryScore]) -> f64 {
    if category_scores.is_empty() {
        return MAX_SCORE;
    }

    let total_weight: f64 = category_scores.iter().map(|c| c.weight).sum();
    let score = if total_weight > 0.0 {
        category_scores
            .iter()
            .map(|c| c.score * c.weight)
            .sum::<f64>()
            / total_weight
    } else {
        // Every category in the run is weighted zero: fall back to a plain mean.
        category_scores.iter().map(|c| c.score).sum::<f64>() / category_scores.len() as f64
    };
    score.clamp(0.0, MAX_SCORE)
}
