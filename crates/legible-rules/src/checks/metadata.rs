//! Title, description, language and canonical link checks.

use crate::descriptor::RuleDescriptor;
use crate::error::Result;
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};

const PRIORITY: i32 = 20;

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "metadata.missing-title",
                "Missing page title",
                Category::Metadata,
                Severity::High,
            )?
            .with_priority(PRIORITY)
            .with_tags(["head"])
            .with_description("The page has no non-empty <title> element."),
            missing_title,
        )?
        .register_fn(
            RuleDescriptor::new(
                "metadata.title-length",
                "Title length out of range",
                Category::Metadata,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["head"])
            .with_description("The title is too short to describe the page or long enough to be truncated."),
            title_length,
        )?
        .register_fn(
            RuleDescriptor::new(
                "metadata.missing-description",
                "Missing meta description",
                Category::Metadata,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["head"])
            .with_description("Neither a description nor an og:description meta tag is present."),
            missing_description,
        )?
        .register_fn(
            RuleDescriptor::new(
                "metadata.missing-lang",
                "Missing document language",
                Category::Metadata,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_description("The root element has no lang attribute."),
            missing_lang,
        )?
        .register_fn(
            RuleDescriptor::new(
                "metadata.missing-canonical",
                "Missing canonical link",
                Category::Metadata,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["head"])
            .with_description("No <link rel=\"canonical\"> identifies the preferred URL."),
            missing_canonical,
        )?;
    Ok(())
}

fn missing_title(ctx: &RuleContext<'_>) -> RuleOutput {
    if ctx.document.title().is_some() {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("The page has no title, so agents cannot label it in results or citations.")
        .remediation("Add a concise, descriptive <title> inside <head>.")
        .location("head > title")
        .build()])
}

fn title_length(ctx: &RuleContext<'_>) -> RuleOutput {
    let Some(title) = ctx.document.title() else {
        return Ok(Vec::new());
    };
    let chars = title.chars().count();
    let min = ctx.config.thresholds.min_title_chars;
    let max = ctx.config.thresholds.max_title_chars;
    if (min..=max).contains(&chars) {
        return Ok(Vec::new());
    }

    let description = if chars < min {
        format!("The title has {chars} characters, fewer than {min}.")
    } else {
        format!("The title has {chars} characters and will likely be truncated after {max}.")
    };
    Ok(vec![ctx
        .issue()
        .description(description)
        .remediation(format!(
            "Keep the title between {min} and {max} characters."
        ))
        .location("head > title")
        .evidence(title)
        .build()])
}

fn missing_description(ctx: &RuleContext<'_>) -> RuleOutput {
    let doc = ctx.document;
    if doc.meta_content("description").is_some() || doc.meta_content("og:description").is_some()
    {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("No meta description summarises the page for snippets and previews.")
        .remediation("Add <meta name=\"description\" content=\"...\"> with a one or two sentence summary.")
        .location("head")
        .build()])
}

fn missing_lang(ctx: &RuleContext<'_>) -> RuleOutput {
    if ctx.document.lang().is_some() {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Without a declared language, tools must guess how to tokenise and translate the text.")
        .remediation("Set the lang attribute on <html>, for example lang=\"en\".")
        .location("html")
        .build()])
}

fn missing_canonical(ctx: &RuleContext<'_>) -> RuleOutput {
    let canonical = ctx.document.attr(r#"link[rel="canonical" i]"#, "href")?;
    if canonical.is_some_and(|href| !href.is_empty()) {
        return Ok(Vec::new());
    }
    Ok(vec![ctx
        .issue()
        .description("Duplicate URLs for this page cannot be consolidated without a canonical link.")
        .remediation("Add <link rel=\"canonical\" href=\"...\"> pointing at the preferred URL.")
        .location("head")
        .build()])
}

#[cfg(test)]
mod tests {
    use crate::checks::test_support::{run, run_with_config};
    use legible_core::ScanConfig;

    const COMPLETE: &str = r#"
        <html lang="en">
        <head>
            <title>A complete guide to legible pages</title>
            <meta name="description" content="How to make pages agents can read.">
            <link rel="canonical" href="https://example.com/page">
        </head>
        <body><p>Body</p></body>
        </html>
    "#;

    const BARE: &str = "<html><head></head><body><p>Body</p></body></html>";

    #[test]
    fn test_complete_head_passes() {
        for id in [
            "metadata.missing-title",
            "metadata.title-length",
            "metadata.missing-description",
            "metadata.missing-lang",
            "metadata.missing-canonical",
        ] {
            assert!(run(id, COMPLETE, Some(200)).is_empty(), "{id} should pass");
        }
    }

    #[test]
    fn test_bare_head_reports() {
        for id in [
            "metadata.missing-title",
            "metadata.missing-description",
            "metadata.missing-lang",
            "metadata.missing-canonical",
        ] {
            let issues = run(id, BARE, Some(200));
            assert_eq!(issues.len(), 1, "{id} should report");
            assert_eq!(issues[0].id, id);
        }
        // No title means nothing to measure.
        assert!(run("metadata.title-length", BARE, Some(200)).is_empty());
    }

    #[test]
    fn test_short_title_reported() {
        let html = "<html><head><title>Home</title></head><body></body></html>";
        let issues = run("metadata.title-length", html, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].evidence, vec!["Home".to_string()]);
    }

    #[test]
    fn test_title_bounds_come_from_config() {
        let html = "<html><head><title>Home</title></head><body></body></html>";
        let mut config = ScanConfig::default();
        config.thresholds.min_title_chars = 4;
        assert!(run_with_config("metadata.title-length", html, None, &config).is_empty());
    }

    #[test]
    fn test_og_description_accepted() {
        let html = r#"<html><head><meta property="og:description" content="Summary"></head><body></body></html>"#;
        assert!(run("metadata.missing-description", html, None).is_empty());
    }
}
