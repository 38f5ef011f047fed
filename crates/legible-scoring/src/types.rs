//! Score and grade types.

use legible_core::{Category, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Best possible category or overall score.
pub const MAX_SCORE: f64 = 100.0;

/// Letter grade for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above
    A,
    /// 75 and above
    B,
    /// 60 and above
    C,
    /// 45 and above
    D,
    /// Below 45
    F,
}

impl Grade {
    /// Grade for a score in `[0, 100]`.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 75.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 45.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Single-letter form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// The category
    pub category: Category,
    /// `100 - total_impact`, clamped to `[0, 100]`
    pub score: f64,
    /// Issues in this category
    pub issue_count: usize,
    /// Sum of impact scores
    pub total_impact: f64,
    /// Configured weight used in the overall average
    pub weight: f64,
    /// Issue count per severity, every severity present
    pub severity_buckets: BTreeMap<Severity, usize>,
}

/// Aggregate scores for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Weighted average of category scores, `[0, 100]`
    pub overall_score: f64,
    /// Letter grade of `overall_score`
    pub grade: Grade,
    /// One entry per category in the run, in category order
    pub category_scores: Vec<CategoryScore>,
    /// Number of issues scored
    pub total_issues: usize,
    /// Issue count per severity across all categories
    pub severity_breakdown: BTreeMap<Severity, usize>,
    /// Always [`MAX_SCORE`]
    pub max_possible_score: f64,
    /// `overall_score / max_possible_score`
    pub normalized_score: f64,
}

impl ScoringResult {
    /// Score of one category, if it was part of the run.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.category_scores
            .iter()
            .find(|score| score.category == category)
    }
}

/// A severity map with every severity at zero.
pub(crate) fn empty_buckets() -> BTreeMap<Severity, usize> {
    Severity::ALL.iter().map(|s| (*s, 0)).collect()
}
