//! Indexing directives and fetch status.

use crate::descriptor::RuleDescriptor;
use crate::error::Result;
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};

const PRIORITY: i32 = 10;

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "crawlability.http-status",
                "Unsuccessful HTTP status",
                Category::Crawlability,
                Severity::Critical,
            )?
            .with_priority(PRIORITY)
            .with_description("The page was fetched with a non-2xx status."),
            http_status,
        )?
        .register_fn(
            RuleDescriptor::new(
                "crawlability.noindex",
                "Page excluded from indexing",
                Category::Crawlability,
                Severity::Critical,
            )?
            .with_priority(PRIORITY)
            .with_tags(["robots"])
            .with_description("A robots meta tag tells crawlers not to index the page."),
            noindex,
        )?
        .register_fn(
            RuleDescriptor::new(
                "crawlability.nosnippet",
                "Snippets disallowed",
                Category::Crawlability,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["robots"])
            .with_description("A robots meta tag forbids quoting the page's text."),
            nosnippet,
        )?;
    Ok(())
}

/// Lowercased directives from `robots` and `googlebot` meta tags.
fn robots_directives(ctx: &RuleContext<'_>) -> Vec<String> {
    ["robots", "googlebot"]
        .into_iter()
        .filter_map(|name| ctx.document.meta_content(name))
        .flat_map(|content| {
            content
                .split(',')
                .map(|directive| directive.trim().to_ascii_lowercase())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn http_status(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(status) = ctx.document.http_status() else {
        return Ok(Vec::new());
    };
    if (200..300).contains(&status) {
        return Ok(Vec::new());
    }

    // Redirects are followed by most agents; only error statuses block.
    let severity = if status >= 400 {
        Severity::Critical
    } else {
        Severity::Medium
    };
    Ok(vec![ctx
        .issue_with_severity(severity)
        .description(format!("The page responded with HTTP {status}."))
        .remediation("Serve the canonical content with a 200 status.")
        .evidence(status.to_string())
        .build()])
}

fn noindex(ctx: &RuleContext<'_>) -> RuleOutput {
    let directives = robots_directives(ctx);
    if !directives.iter().any(|d| d == "noindex" || d == "none") {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Crawlers are told not to index this page, so it will not appear in answers.")
        .remediation("Remove noindex from the robots meta tag if the page should be discoverable.")
        .location(r#"meta[name="robots"]"#)
        .build()])
}

fn nosnippet(ctx: &RuleContext<'_>) -> RuleOutput {
    let directives = robots_directives(ctx);
    if !directives
        .iter()
        .any(|d| d == "nosnippet" || d == "max-snippet:0")
    {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Agents may index the page but are told not to quote it.")
        .remediation("Remove nosnippet, or use data-nosnippet on the specific passages to hide.")
        .location(r#"meta[name="robots"]"#)
        .build()])
}
