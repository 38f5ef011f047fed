//! Text alternatives for images and links.

use crate::descriptor::RuleDescriptor;
use crate::error::Result;
use crate::registry::RuleRegistryBuilder;
use crate::rule::{RuleContext, RuleOutput};
use legible_core::{Category, Severity};
use legible_document::visible_text;

const PRIORITY: i32 = 50;
const MAX_EVIDENCE: usize = 5;

pub(crate) fn register(builder: &mut RuleRegistryBuilder) -> Result<()> {
    builder
        .register_fn(
            RuleDescriptor::new(
                "accessibility.image-missing-alt",
                "Images without alt text",
                Category::Accessibility,
                Severity::Medium,
            )?
            .with_priority(PRIORITY)
            .with_tags(["images"])
            .with_description("<img> elements lack an alt attribute."),
            image_missing_alt,
        )?
        .register_fn(
            RuleDescriptor::new(
                "accessibility.empty-link",
                "Links without text",
                Category::Accessibility,
                Severity::Low,
            )?
            .with_priority(PRIORITY)
            .with_tags(["links"])
            .with_description("Links have no visible text, aria-label or image alt to name them."),
            empty_link,
        )?;
    Ok(())
}

fn image_missing_alt(ctx: &RuleContext<'_>) -> RuleOutput {
    let missing: Vec<String> = ctx
        .document
        .select("img:not([alt])")?
        .into_iter()
        .map(|img| img.value().attr("src").unwrap_or("(no src)").to_string())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let mut issue = ctx
        .issue()
        .description(format!(
            "{} image(s) have no alt attribute, so their meaning is lost to text-only readers.",
            missing.len()
        ))
        .remediation("Add descriptive alt text, or alt=\"\" for purely decorative images.")
        .location("img");
    for src in missing.into_iter().take(MAX_EVIDENCE) {
        issue = issue.evidence(src);
    }
    Ok(vec![issue.build()])
}

fn empty_link(ctx: &RuleContext<'_>) -> RuleOutput {
    let mut empty = Vec::new();
    for link in ctx.document.select("a[href]")? {
        let has_label = link
            .value()
            .attr("aria-label")
            .is_some_and(|label| !label.trim().is_empty());
        let has_img_alt = link
            .descendants()
            .filter_map(legible_document::ElementRef::wrap)
            .filter(|el| el.value().name() == "img")
            .any(|img| img.value().attr("alt").is_some_and(|alt| !alt.trim().is_empty()));
        if !has_label && !has_img_alt && visible_text(link).is_empty() {
            empty.push(link.value().attr("href").unwrap_or_default().to_string());
        }
    }
    if empty.is_empty() {
        return Ok(Vec::new());
    }

    let mut issue = ctx
        .issue()
        .description(format!(
            "{} link(s) have no accessible name; agents cannot tell where they lead.",
            empty.len()
        ))
        .remediation("Give every link visible text or an aria-label.")
        .location("a[href]");
    for href in empty.into_iter().take(MAX_EVIDENCE) {
        issue = issue.evidence(href);
    }
    Ok(vec![issue.build()])
}

#[cfg(test)]
mod tests {
    use crate::checks::test_support::run;

    #[test]
    fn test_image_missing_alt() {
        let html = r#"<html><body>
            <img src="/a.png" alt="Chart">
            <img src="/b.png" alt="">
            <img src="/c.png">
        </body></html>"#;
        let issues = run("accessibility.image-missing-alt", html, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].evidence, vec!["/c.png".to_string()]);
    }

    #[test]
    fn test_empty_link() {
        let html = r#"<html><body>
            <a href="/ok">Docs</a>
            <a href="/label" aria-label="Home"></a>
            <a href="/img"><img src="x.png" alt="Logo"></a>
            <a href="/empty"> </a>
        </body></html>"#;
        let issues = run("accessibility.empty-link", html, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].evidence, vec!["/empty".to_string()]);
    }
}
