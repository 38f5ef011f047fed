//! Heading outline, semantic containers and content volume.

use crate::descriptor::RuleDescriptor;
use crate::error::Result;
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};

const PRIORITY: i32 = 30;

/// Elements that mark where the primary content lives.
const SEMANTIC_CONTAINERS: &str = r#"main, article, [role="main"]"#;

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "content-structure.missing-h1",
                "Missing top-level heading",
                Category::ContentStructure,
                Severity::High,
            )?
            .with_priority(PRIORITY)
            .with_tags(["headings"])
            .with_description("The page has no non-empty <h1>."),
            missing_h1,
        )?
        .register_fn(
            RuleDescriptor::new(
                "content-structure.multiple-h1",
                "Multiple top-level headings",
                Category::ContentStructure,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["headings"])
            .with_description("More than one <h1> competes for the page topic."),
            multiple_h1,
        )?
        .register_fn(
            RuleDescriptor::new(
                "content-structure.heading-skip",
                "Skipped heading level",
                Category::ContentStructure,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["headings"])
            .with_description("A heading is more than one level deeper than the heading before it."),
            heading_skip,
        )?
        .register_fn(
            RuleDescriptor::new(
                "content-structure.missing-semantic-container",
                "No semantic content container",
                Category::ContentStructure,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_description("Neither <main>, <article> nor role=\"main\" marks the primary content."),
            missing_semantic_container,
        )?
        .register_fn(
            RuleDescriptor::new(
                "content-structure.thin-content",
                "Thin content",
                Category::ContentStructure,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_description("The page has too little visible text to answer questions from."),
            thin_content,
        )?;
    Ok(())
}

fn missing_h1(ctx: &RuleContext<'_>) -> RuleOutput {
    if ctx.document.headings().iter().any(|h| h.level == 1) {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Without an <h1> the page topic has to be inferred from the title or body.")
        .remediation("Add a single <h1> that states what the page is about.")
        .location("h1")
        .build()])
}

fn multiple_h1(ctx: &RuleContext<'_>) -> RuleOutput {
    let h1s: Vec<String> = ctx
        .document
        .headings()
        .into_iter()
        .filter(|h| h.level == 1)
        .map(|h| h.text)
        .collect();
    if h1s.len() <= 1 {
        return Ok(Vec::new());
    }

    let mut issue = ctx
        .issue()
        .description(format!(
            "Found {} <h1> elements; only one should name the page topic.",
            h1s.len()
        ))
        .remediation("Keep one <h1> and demote the others to <h2>.")
        .location("h1");
    for text in h1s {
        issue = issue.evidence(text);
    }
    Ok(vec![issue.build()])
}

fn heading_skip(ctx: &RuleContext<'_>) -> RuleOutput {
    let headings = ctx.document.headings();
    let skips: Vec<String> = headings
        .windows(2)
        .filter(|pair| pair[1].level > pair[0].level + 1)
        .map(|pair| {
            format!(
                "h{} \"{}\" followed by h{} \"{}\"",
                pair[0].level, pair[0].text, pair[1].level, pair[1].text
            )
        })
        .collect();
    if skips.is_empty() {
        return Ok(Vec::new());
    }

    let mut issue = ctx
        .issue()
        .description(format!(
            "The heading outline skips a level {} time(s), which breaks section nesting.",
            skips.len()
        ))
        .remediation("Nest headings one level at a time (h1, then h2, then h3).");
    for skip in skips {
        issue = issue.evidence(skip);
    }
    Ok(vec![issue.build()])
}

fn missing_semantic_container(ctx: &RuleContext<'_>) -> RuleOutput {
    if ctx.document.exists(SEMANTIC_CONTAINERS)? {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Primary content is not separated from navigation and chrome.")
        .remediation("Wrap the main content in <main> or <article>.")
        .location("body")
        .build()])
}

fn thin_content(ctx: &RuleContext<'_>) -> RuleOutput {
    let words = ctx.document.word_count();
    let minimum = ctx.config.thresholds.min_word_count;
    if words >= minimum {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description(format!(
            "The page has {words} visible words, fewer than the {minimum} expected."
        ))
        .remediation("Add substantive text content, or server-render content that is currently loaded by scripts.")
        .location("body")
        .build()])
}
