//! Strategy selection and determinism on realistic pages.

use legible_content::{ChunkQuality, ChunkStrategy, ContentChunker, ExtractabilityMapper};
use legible_core::ScanConfig;
use legible_document::DocumentSnapshot;
use pretty_assertions::assert_eq;

fn outline_page() -> String {
    let para = "This paragraph explains one part of the topic in a few plain sentences. \
                It is long enough to carry meaning but short enough to read quickly.";
    format!(
        r#"<!doctype html>
        <html lang="en">
        <head><title>Handbook</title></head>
        <body>
          <nav><ul><li>Home</li><li>Docs</li></ul></nav>
          <main>
            <h1>Handbook</h1>
            <p>{para}</p>
            <h2>Getting started</h2>
            <p>{para}</p>
            <h3>Requirements</h3>
            <ul><li>A computer</li><li>A browser</li></ul>
            <h2>Reference</h2>
            <p>{para}</p>
            <table><tr><th>Option</th><td>Meaning</td></tr></table>
          </main>
          <footer><p>Copyright</p></footer>
        </body>
        </html>"#
    )
}

fn paragraph_page() -> String {
    let para = "Plain paragraphs with no headings at all keep going for a while so the \
                packer has something to work with.";
    let body: String = (0..12).map(|_| format!("<p>{para}</p>")).collect();
    format!("<html><body><div class=\"content\">{body}</div></body></html>")
}

fn snapshot(html: &str) -> DocumentSnapshot {
    DocumentSnapshot::parse("https://example.com/handbook", html, Some(200)).expect("parse")
}

#[test]
fn outline_page_uses_heading_strategy() {
    let config = ScanConfig {
        chunk_token_budget: 40,
        ..ScanConfig::default()
    };
    let result = ContentChunker::from_config(&config).chunk(&snapshot(&outline_page()));

    assert_eq!(result.strategy, ChunkStrategy::HeadingBased);
    assert!(result.heading_coverage > config.heading_coverage_threshold);

    let headings: Vec<&str> = result
        .chunks
        .iter()
        .filter_map(|c| c.heading.as_deref())
        .collect();
    assert_eq!(
        headings,
        vec!["Handbook", "Getting started", "Requirements", "Reference"]
    );
    assert_eq!(result.total_chunks, result.chunks.len());
    assert!(result
        .chunks
        .iter()
        .all(|c| !c.text.contains("Copyright") && !c.text.contains("Docs")));
}

#[test]
fn paragraph_page_uses_paragraph_strategy() {
    let config = ScanConfig {
        chunk_token_budget: 100,
        ..ScanConfig::default()
    };
    let result = ContentChunker::from_config(&config).chunk(&snapshot(&paragraph_page()));

    assert_eq!(result.strategy, ChunkStrategy::ParagraphBased);
    assert!(result.total_chunks > 1);
    for (i, chunk) in result.chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert!(chunk.heading.is_none());
        assert_ne!(chunk.quality, ChunkQuality::Excellent);
    }
    let distributed: usize = result.quality_distribution.values().sum();
    assert_eq!(distributed, result.total_chunks);
}

#[test]
fn chunking_is_idempotent() {
    let config = ScanConfig::default();
    let chunker = ContentChunker::from_config(&config);
    for html in [outline_page(), paragraph_page()] {
        let doc = snapshot(&html);
        assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));

        let reparsed = snapshot(&html);
        assert_eq!(chunker.chunk(&doc), chunker.chunk(&reparsed));
    }
}

#[test]
fn outline_page_is_fully_extractable() {
    let map = ExtractabilityMapper::from_config(&ScanConfig::default())
        .map(&snapshot(&outline_page()))
        .expect("map");
    assert!(!map.has_client_only_content);
    assert_eq!(map.script_count, 0);
}
