//! Property tests: scores stay in range whatever the issues and weights.

use legible_core::{Category, Issue, ScanConfig, Severity};
use legible_scoring::{compare_scans, IssueScorer, ScanView, MAX_SCORE};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn issues() -> impl Strategy<Value = Vec<Issue>> {
    prop::collection::vec(
        (0u32..50, category(), severity(), -10.0f64..80.0),
        0..40,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(n, category, severity, impact)| {
                Issue::builder(format!("{}.rule-{n}", category.as_str()), category, severity)
                    .impact(impact)
                    .build()
            })
            .collect()
    })
}

fn config() -> impl Strategy<Value = ScanConfig> {
    prop::collection::vec(0.0f64..5.0, Category::ALL.len()).prop_map(|weights| {
        let mut config = ScanConfig::default();
        for (category, weight) in Category::ALL.iter().zip(weights) {
            config.category_weights.insert(*category, weight);
        }
        config
    })
}

proptest! {
    /// Property: category and overall scores stay within [0, 100]
    #[test]
    fn scores_stay_in_range(
        issues in issues(),
        config in config(),
        evaluated in prop::collection::btree_set(category(), 0..6),
    ) {
        let result = IssueScorer::new(&config).score(&issues, &evaluated);

        prop_assert!((0.0..=MAX_SCORE).contains(&result.overall_score));
        prop_assert!((0.0..=1.0).contains(&result.normalized_score));
        prop_assert_eq!(result.total_issues, issues.len());
        for category in &result.category_scores {
            prop_assert!((0.0..=MAX_SCORE).contains(&category.score));
        }
    }

    /// Property: no issues always scores 100
    #[test]
    fn no_issues_scores_perfect(
        config in config(),
        evaluated in prop::collection::btree_set(category(), 0..6),
    ) {
        let result = IssueScorer::new(&config).score(&[], &evaluated);
        prop_assert!((result.overall_score - MAX_SCORE).abs() < 1e-9);
    }

    /// Property: comparing a scan with itself is neutral
    #[test]
    fn self_comparison_is_neutral(issues in issues()) {
        let evaluated: BTreeSet<Category> = Category::ALL.into_iter().collect();
        let scoring = IssueScorer::new(&ScanConfig::default()).score(&issues, &evaluated);
        let view = ScanView { scoring: &scoring, issues: &issues };

        let diff = compare_scans(view, view);
        prop_assert_eq!(diff.score_change, 0.0);
        prop_assert_eq!(diff.issue_change, 0);
        prop_assert_eq!(diff.grade_change.as_str(), "No change");
        prop_assert!(diff.new_issues.is_empty());
        prop_assert!(diff.resolved_issues.is_empty());
    }
}
