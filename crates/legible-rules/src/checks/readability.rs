//! Sentence length and reading grade.
//!
//! Both checks only look at prose blocks and skip pages with fewer words than
//! `thresholds.min_word_count`, where the estimates are too noisy to act on.

use crate::descriptor::RuleDescriptor;
use crate::error::{CheckError, Result};
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};
use legible_document::{visible_text, word_count};
use regex::Regex;
use std::sync::OnceLock;

const PRIORITY: i32 = 60;
const PROSE_BLOCKS: &str = "p, li, blockquote, dd";

/// Split text into sentences on terminal punctuation.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    static SENTENCE_END: OnceLock<Regex> = OnceLock::new();
    let regex = SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("valid regex"));

    regex
        .split(text)
        .map(str::trim)
        .filter(|sentence| word_count(sentence) > 0)
        .collect()
}

/// Rough English syllable count: vowel groups, minus a silent trailing `e`.
#[must_use]
pub fn estimate_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if word.is_empty() {
        return 0;
    }

    let mut groups = 0;
    let mut in_vowel_group = false;
    for c in word.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !in_vowel_group {
            groups += 1;
        }
        in_vowel_group = vowel;
    }
    if groups > 1 && word.ends_with('e') && !word.ends_with("le") {
        groups -= 1;
    }
    groups.max(1)
}

/// Flesch-Kincaid grade level, or `None` for text without words.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn flesch_kincaid_grade(text: &str) -> Option<f64> {
    let sentences = split_sentences(text).len();
    let words: Vec<&str> = text.split_whitespace().collect();
    if sentences == 0 || words.is_empty() {
        return None;
    }
    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();
    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    Some(0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59)
}

/// Joined prose text, or `None` when there is too little to judge.
fn prose(ctx: &RuleContext<'_>) -> std::result::Result<Option<String>, CheckError> {
    let text = ctx
        .document
        .select(PROSE_BLOCKS)?
        .into_iter()
        .map(visible_text)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if word_count(&text) < ctx.config.thresholds.min_word_count {
        return Ok(None);
    }
    Ok(Some(text))
}

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "readability.long-sentences",
                "Long sentences",
                Category::Readability,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["prose"])
            .with_description("Average sentence length exceeds the configured maximum."),
            long_sentences,
        )?
        .register_fn(
            RuleDescriptor::new(
                "readability.reading-grade",
                "High reading grade",
                Category::Readability,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["prose"])
            .with_description("Estimated reading grade exceeds the configured maximum."),
            reading_grade,
        )?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn long_sentences(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(text) = prose(ctx)? else {
        return Ok(Vec::new());
    };
    let sentences = split_sentences(&text);
    if sentences.is_empty() {
        return Ok(Vec::new());
    }
    let average = word_count(&text) as f64 / sentences.len() as f64;
    let maximum = ctx.config.thresholds.max_avg_sentence_words;
    if average <= maximum {
        return Ok(Vec::new());
    }

    let longest = sentences
        .iter()
        .max_by_key(|sentence| word_count(sentence))
        .map(|sentence| (*sentence).to_string())
        .unwrap_or_default();
    Ok(vec![ctx
        .issue()
        .description(format!(
            "Sentences average {average:.1} words, above the {maximum:.0} word target."
        ))
        .remediation("Split long sentences so each carries one idea.")
        .evidence(longest)
        .build()])
}

fn reading_grade(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(text) = prose(ctx)? else {
        return Ok(Vec::new());
    };
    let Some(grade) = flesch_kincaid_grade(&text) else {
        return Ok(Vec::new());
    };
    let maximum = ctx.config.thresholds.max_reading_grade;
    if grade <= maximum {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description(format!(
            "Estimated reading grade is {grade:.1}, above the target of {maximum:.0}."
        ))
        .remediation("Prefer shorter words and sentences; define jargon where it first appears.")
        .evidence(format!("{grade:.1}"))
        .build()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::run_with_config;
    use legible_core::ScanConfig;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("One two. Three four! Five? ... ");
        assert_eq!(sentences, vec!["One two", "Three four", "Five"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_estimate_syllables() {
        assert_eq!(estimate_syllables("cat"), 1);
        assert_eq!(estimate_syllables("table"), 2);
        assert_eq!(estimate_syllables("make"), 1);
        assert_eq!(estimate_syllables("readability"), 5);
        assert_eq!(estimate_syllables("123"), 0);
    }

    #[test]
    fn test_grade_orders_simple_below_complex() {
        let simple = flesch_kincaid_grade("The cat sat. The dog ran. We had fun.").expect("grade");
        let complex = flesch_kincaid_grade(
            "Organizational interoperability necessitates comprehensive institutional \
             coordination across heterogeneous administrative jurisdictions.",
        )
        .expect("grade");
        assert!(simple < complex);
        assert_eq!(flesch_kincaid_grade(""), None);
    }

    fn low_floor() -> ScanConfig {
        let mut config = ScanConfig::default();
        config.thresholds.min_word_count = 5;
        config
    }

    #[test]
    fn test_long_sentences_reported() {
        let sentence = "word ".repeat(40);
        let html = format!("<html><body><p>{sentence}.</p><p>{sentence}.</p></body></html>");
        let issues = run_with_config("readability.long-sentences", &html, None, &low_floor());
        assert_eq!(issues.len(), 1);

        let short = "<html><body><p>Short one here. Another short one.</p></body></html>";
        assert!(
            run_with_config("readability.long-sentences", short, None, &low_floor()).is_empty()
        );
    }

    #[test]
    fn test_below_word_floor_skipped() {
        let html = "<html><body><p>Incomprehensibility characterizes institutionalization.</p></body></html>";
        assert!(run_with_config("readability.reading-grade", html, None, &ScanConfig::default())
            .is_empty());
        assert_eq!(
            run_with_config("readability.reading-grade", html, None, &low_floor()).len(),
            0,
            "three words stay below a five word floor"
        );

        let mut config = low_floor();
        config.thresholds.min_word_count = 3;
        assert_eq!(
            run_with_config("readability.reading-grade", html, None, &config).len(),
            1
        );
    }
}
