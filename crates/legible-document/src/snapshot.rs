//! The immutable per-scan document snapshot.

use crate::error::{DocumentError, Result};
use crate::text::{visible_text, word_count};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A non-empty heading element in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,
    /// Whitespace-normalized text
    pub text: String,
}

/// Read-only representation of one fetched and parsed page.
///
/// The snapshot never changes after [`parse`](Self::parse) returns, so every
/// analysis stage can borrow it concurrently.
pub struct DocumentSnapshot {
    url: Url,
    raw_html: String,
    http_status: Option<u16>,
    html: Html,
}

impl std::fmt::Debug for DocumentSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSnapshot")
            .field("url", &self.url.as_str())
            .field("http_status", &self.http_status)
            .field("raw_html_len", &self.raw_html.len())
            .finish_non_exhaustive()
    }
}

impl DocumentSnapshot {
    /// Build a snapshot from fetch output.
    ///
    /// # Errors
    /// Returns error if the markup is empty or the URL is not a valid http(s) URL.
    pub fn parse(url: &str, raw_html: impl Into<String>, http_status: Option<u16>) -> Result<Self> {
        let raw_html = raw_html.into();
        if raw_html.trim().is_empty() {
            return Err(DocumentError::EmptyMarkup);
        }

        let url = Url::parse(url).map_err(|e| DocumentError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DocumentError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        let html = Html::parse_document(&raw_html);
        if !html.errors.is_empty() {
            tracing::debug!(
                url = %url,
                parse_errors = html.errors.len(),
                "document parsed with recoverable errors"
            );
        }

        Ok(Self {
            url,
            raw_html,
            http_status,
            html,
        })
    }

    /// The page URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The markup exactly as fetched.
    #[must_use]
    pub fn raw_html(&self) -> &str {
        &self.raw_html
    }

    /// The HTTP status of the fetch, when known.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// The parsed tree.
    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// All elements matching a CSS selector, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).collect())
    }

    /// The first element matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next())
    }

    /// Number of elements matching a CSS selector.
    pub fn count(&self, selector: &str) -> Result<usize> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).count())
    }

    /// Whether any element matches a CSS selector.
    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.select_first(selector)?.is_some())
    }

    /// An attribute of the first element matching a selector.
    pub fn attr(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        Ok(self
            .select_first(selector)?
            .and_then(|el| el.value().attr(attribute))
            .map(|value| value.trim().to_string()))
    }

    /// The `<body>` element. html5ever always synthesizes one.
    #[must_use]
    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.select_first("body").ok().flatten()
    }

    /// Non-empty `<title>` text.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.select_first("title")
            .ok()
            .flatten()
            .map(visible_text)
            .filter(|text| !text.is_empty())
    }

    /// Content of a `<meta>` tag matched by `name` or `property`.
    #[must_use]
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let sel = format!(r#"meta[name="{key}" i], meta[property="{key}" i]"#);
        self.select(&sel)
            .ok()?
            .into_iter()
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(ToString::to_string)
    }

    /// The `lang` attribute of the root element.
    #[must_use]
    pub fn lang(&self) -> Option<String> {
        self.attr("html", "lang")
            .ok()
            .flatten()
            .filter(|lang| !lang.is_empty())
    }

    /// Non-empty headings in document order.
    #[must_use]
    pub fn headings(&self) -> Vec<Heading> {
        self.select("h1, h2, h3, h4, h5, h6")
            .map(|elements| {
                elements
                    .into_iter()
                    .filter_map(|el| {
                        let level = heading_level(el.value().name())?;
                        let text = visible_text(el);
                        (!text.is_empty()).then_some(Heading { level, text })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Visible body text with whitespace collapsed.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body().map(visible_text).unwrap_or_default()
    }

    /// Words of visible body text.
    #[must_use]
    pub fn word_count(&self) -> usize {
        word_count(&self.body_text())
    }

    /// Raw contents of every `application/ld+json` script block.
    #[must_use]
    pub fn jsonld_blocks(&self) -> Vec<String> {
        self.select(r#"script[type="application/ld+json"]"#)
            .map(|elements| {
                elements
                    .into_iter()
                    .map(|el| el.inner_html().trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Level of a heading tag name (`h1` → 1).
#[must_use]
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| DocumentError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!doctype html>
        <html lang="en">
        <head>
            <title> Field  Guide </title>
            <meta name="description" content="A guide to the field.">
            <meta property="og:title" content="Field Guide">
            <script type="application/ld+json">{"@type": "Article"}</script>
        </head>
        <body>
            <h1>Field Guide</h1>
            <p>First paragraph of text.</p>
            <h2></h2>
            <h2>Details</h2>
            <p>Second paragraph.</p>
            <script>console.log("not text")</script>
        </body>
        </html>
    "#;

    fn snapshot() -> DocumentSnapshot {
        DocumentSnapshot::parse("https://example.com/guide", PAGE, Some(200))
            .expect("parse snapshot")
    }

    #[test]
    fn test_parse_rejects_empty_markup() {
        let result = DocumentSnapshot::parse("https://example.com", "  \n ", None);
        assert!(matches!(result, Err(DocumentError::EmptyMarkup)));
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        let result = DocumentSnapshot::parse("not a url", PAGE, None);
        assert!(matches!(result, Err(DocumentError::InvalidUrl { .. })));

        let result = DocumentSnapshot::parse("ftp://example.com/file", PAGE, None);
        assert!(matches!(result, Err(DocumentError::UnsupportedScheme { .. })));
    }

    #[test]
    fn test_metadata_accessors() {
        let doc = snapshot();
        assert_eq!(doc.url().as_str(), "https://example.com/guide");
        assert_eq!(doc.http_status(), Some(200));
        assert_eq!(doc.title().as_deref(), Some("Field Guide"));
        assert_eq!(
            doc.meta_content("description").as_deref(),
            Some("A guide to the field.")
        );
        assert_eq!(doc.meta_content("og:title").as_deref(), Some("Field Guide"));
        assert_eq!(doc.meta_content("keywords"), None);
        assert_eq!(doc.lang().as_deref(), Some("en"));
    }

    #[test]
    fn test_headings_skip_empty() {
        let doc = snapshot();
        let headings = doc.headings();
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].text, "Details");
    }

    #[test]
    fn test_body_text_and_word_count() {
        let doc = snapshot();
        let text = doc.body_text();
        assert!(text.starts_with("Field Guide First paragraph"));
        assert!(!text.contains("console.log"));
        assert_eq!(doc.word_count(), 9);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = snapshot();
        let result = doc.select("p[");
        assert!(matches!(result, Err(DocumentError::InvalidSelector { .. })));
    }

    #[test]
    fn test_jsonld_blocks() {
        let doc = snapshot();
        assert_eq!(doc.jsonld_blocks(), vec![r#"{"@type": "Article"}"#.to_string()]);
        assert_eq!(doc.count("p").expect("valid selector"), 2);
        assert!(doc.exists("h1").expect("valid selector"));
    }
}
