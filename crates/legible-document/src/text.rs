//! Visible-text extraction helpers.
//!
//! Text inside `script`, `style`, `noscript` and `template` is never visible
//! to a reader and is skipped. Block-level elements are separated by a space
//! so adjacent paragraphs do not run together.

use scraper::node::Node;
use scraper::ElementRef;

/// Elements whose text content is never visible.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Visible text under `element` exactly as it appears in the markup,
/// whitespace runs included.
#[must_use]
pub fn raw_visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

/// Visible text under `element` with whitespace collapsed to single spaces.
#[must_use]
pub fn visible_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&raw_visible_text(element))
}

/// Collapse every whitespace run to a single space and trim both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
