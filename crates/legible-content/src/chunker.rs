//! Splitting visible text into budget-sized chunks.
//!
//! The body is flattened into blocks: headings (`h1`-`h6`) and text blocks
//! (`p`, `li`, `blockquote`, `pre`, `dd`, `dt`, `figcaption`, `td`, `th`).
//! Navigation, footers and non-rendered elements are skipped.
//!
//! When more than `heading_coverage_threshold` of the text sits under a
//! heading, chunks follow the heading outline. Otherwise consecutive blocks
//! are packed until the token budget is reached.
//!
//! Token counts are an estimate of one token per four characters, rounded
//! up. The estimate is deterministic, so chunking the same snapshot twice
//! gives identical boundaries.

use legible_core::ScanConfig;
use legible_document::{
    heading_level, normalize_whitespace, raw_visible_text, DocumentSnapshot, ElementRef,
};
use regex::Regex;
use scraper::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::debug;

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

const VERY_LARGE_TOKENS: usize = 1000;
const VERY_SMALL_TOKENS: usize = 50;

/// Separator between blocks in a chunk's text.
const BLOCK_SEPARATOR: &str = "\n\n";

const TEXT_BLOCK_TAGS: &[&str] = &[
    "p", "li", "blockquote", "pre", "dd", "dt", "figcaption", "td", "th",
];
const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "template", "nav", "footer"];

/// Phrasing elements whose text joins the surrounding run of loose text.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "font", "i",
    "img", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub",
    "sup", "time", "u", "var", "wbr",
];

/// How the chunk boundaries were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStrategy {
    /// Chunks follow the heading outline
    HeadingBased,
    /// Consecutive blocks packed up to the token budget
    ParagraphBased,
}

/// Quality bucket of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkQuality {
    /// No quality issues
    Excellent,
    /// One quality issue
    Good,
    /// Two quality issues
    Fair,
    /// Three or more quality issues
    Poor,
}

impl ChunkQuality {
    /// All buckets, best first.
    pub const ALL: [ChunkQuality; 4] = [
        ChunkQuality::Excellent,
        ChunkQuality::Good,
        ChunkQuality::Fair,
        ChunkQuality::Poor,
    ];

    /// Bucket for a number of quality issues.
    #[must_use]
    pub fn from_issue_count(count: usize) -> Self {
        match count {
            0 => ChunkQuality::Excellent,
            1 => ChunkQuality::Good,
            2 => ChunkQuality::Fair,
            _ => ChunkQuality::Poor,
        }
    }
}

/// A reason a chunk is hard to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityIssue {
    /// More than 1000 estimated tokens
    VeryLarge,
    /// Fewer than 50 estimated tokens
    VerySmall,
    /// Noise ratio above the configured threshold
    HighNoise,
    /// No heading names the chunk
    NoClearHeading,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            QualityIssue::VeryLarge => "very large",
            QualityIssue::VerySmall => "very small",
            QualityIssue::HighNoise => "high noise",
            QualityIssue::NoClearHeading => "no clear heading",
        };
        f.write_str(text)
    }
}

/// One bounded unit of page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Position in reading order, starting at 0
    pub index: usize,
    /// Heading that names the chunk
    pub heading: Option<String>,
    /// Block texts separated by blank lines
    pub text: String,
    /// Estimated tokens in `text`
    pub token_count: usize,
    /// Share of raw characters that were whitespace runs or markup residue
    pub noise_ratio: f64,
    /// Quality bucket
    pub quality: ChunkQuality,
    /// Why the chunk is not excellent
    pub quality_issues: Vec<QualityIssue>,
}

/// All chunks of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// Strategy that produced the chunks
    pub strategy: ChunkStrategy,
    /// `chunks.len()`
    pub total_chunks: usize,
    /// Mean `token_count`, 0 without chunks
    pub average_tokens_per_chunk: f64,
    /// Mean `noise_ratio`, 0 without chunks
    pub average_noise_ratio: f64,
    /// Share of text-block characters under a heading
    pub heading_coverage: f64,
    /// Chunk count per quality bucket, every bucket present
    pub quality_distribution: BTreeMap<ChunkQuality, usize>,
    /// The chunks in reading order
    pub chunks: Vec<ContentChunk>,
}

/// Splits a snapshot into chunks.
#[derive(Debug, Clone)]
pub struct ContentChunker {
    token_budget: usize,
    heading_coverage_threshold: f64,
    noise_ratio_threshold: f64,
}

impl ContentChunker {
    /// Create a chunker with explicit thresholds.
    #[must_use]
    pub fn new(
        token_budget: usize,
        heading_coverage_threshold: f64,
        noise_ratio_threshold: f64,
    ) -> Self {
        Self {
            token_budget: token_budget.max(1),
            heading_coverage_threshold,
            noise_ratio_threshold,
        }
    }

    /// Create a chunker from a scan configuration.
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.chunk_token_budget,
            config.heading_coverage_threshold,
            config.noise_ratio_threshold,
        )
    }

    /// Chunk the snapshot's body.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn chunk(&self, document: &DocumentSnapshot) -> ChunkingResult {
        let blocks = extract_blocks(document);
        let heading_coverage = heading_coverage(&blocks);

        let (strategy, spans) = if heading_coverage > self.heading_coverage_threshold {
            (
                ChunkStrategy::HeadingBased,
                heading_spans(&blocks, self.token_budget),
            )
        } else {
            (
                ChunkStrategy::ParagraphBased,
                paragraph_spans(&blocks, self.token_budget),
            )
        };

        let chunks: Vec<ContentChunk> = spans
            .into_iter()
            .enumerate()
            .map(|(index, (heading, range))| self.build_chunk(index, heading, &blocks[range]))
            .collect();

        let mut quality_distribution: BTreeMap<ChunkQuality, usize> =
            ChunkQuality::ALL.iter().map(|q| (*q, 0)).collect();
        for chunk in &chunks {
            *quality_distribution.entry(chunk.quality).or_insert(0) += 1;
        }

        let (average_tokens_per_chunk, average_noise_ratio) = if chunks.is_empty() {
            (0.0, 0.0)
        } else {
            let n = chunks.len() as f64;
            (
                chunks.iter().map(|c| c.token_count as f64).sum::<f64>() / n,
                chunks.iter().map(|c| c.noise_ratio).sum::<f64>() / n,
            )
        };

        debug!(
            ?strategy,
            blocks = blocks.len(),
            chunks = chunks.len(),
            heading_coverage,
            "chunked document"
        );

        ChunkingResult {
            strategy,
            total_chunks: chunks.len(),
            average_tokens_per_chunk,
            average_noise_ratio,
            heading_coverage,
            quality_distribution,
            chunks,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_chunk(&self, index: usize, heading: Option<String>, blocks: &[Block]) -> ContentChunk {
        let text = blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);
        let token_count = estimate_tokens(&text);

        let raw_chars: usize = blocks.iter().map(|block| block.raw_chars).sum();
        let noise_chars: usize = blocks.iter().map(|block| block.noise_chars).sum();
        let noise_ratio = ratio(noise_chars, raw_chars);

        let quality_issues = self.quality_issues(token_count, noise_ratio, heading.is_some());
        ContentChunk {
            index,
            heading,
            text,
            token_count,
            noise_ratio,
            quality: ChunkQuality::from_issue_count(quality_issues.len()),
            quality_issues,
        }
    }

    fn quality_issues(
        &self,
        token_count: usize,
        noise_ratio: f64,
        has_heading: bool,
    ) -> Vec<QualityIssue> {
        let mut issues = Vec::new();
        if token_count > VERY_LARGE_TOKENS {
            issues.push(QualityIssue::VeryLarge);
        }
        if token_count < VERY_SMALL_TOKENS {
            issues.push(QualityIssue::VerySmall);
        }
        if noise_ratio > self.noise_ratio_threshold {
            issues.push(QualityIssue::HighNoise);
        }
        if !has_heading {
            issues.push(QualityIssue::NoClearHeading);
        }
        issues
    }
}

/// Estimated tokens: characters divided by [`CHARS_PER_TOKEN`], rounded up.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Share of `raw` made of collapsible whitespace and markup residue
/// (stray tags, undecoded entities, template placeholders).
#[must_use]
pub fn noise_ratio(raw: &str) -> f64 {
    let (raw_chars, noise_chars) = noise_chars(raw);
    ratio(noise_chars, raw_chars)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).min(1.0)
    }
}

/// `(raw characters, noise characters)` of a raw text run.
fn noise_chars(raw: &str) -> (usize, usize) {
    static RESIDUE: OnceLock<Regex> = OnceLock::new();
    let residue = RESIDUE.get_or_init(|| {
        Regex::new(r"</?[A-Za-z][^<>]*>|&(?:#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);|\{\{.*?\}\}|\{%.*?%\}")
            .expect("valid regex")
    });

    let raw_chars = raw.chars().count();
    let normalized = normalize_whitespace(raw);
    let whitespace = raw_chars - normalized.chars().count();
    let residue_chars: usize = residue
        .find_iter(&normalized)
        .map(|m| m.as_str().chars().count())
        .sum();
    (raw_chars, whitespace + residue_chars)
}

/// One heading or text block.
#[derive(Debug, Clone)]
struct Block {
    /// Heading level, `None` for text blocks
    level: Option<u8>,
    text: String,
    raw_chars: usize,
    noise_chars: usize,
}

impl Block {
    fn from_raw(raw: &str, level: Option<u8>) -> Option<Self> {
        let text = normalize_whitespace(raw);
        if text.is_empty() {
            return None;
        }
        let (raw_chars, noise_chars) = noise_chars(raw);
        Some(Self {
            level,
            text,
            raw_chars,
            noise_chars,
        })
    }

    fn is_heading(&self) -> bool {
        self.level.is_some()
    }
}

fn extract_blocks(document: &DocumentSnapshot) -> Vec<Block> {
    let mut blocks = Vec::new();
    if let Some(body) = document.body() {
        collect_blocks(body, &mut blocks);
    }
    blocks
}

/// Flatten `element` into blocks. Text written directly into a container,
/// together with its inline siblings, forms an implicit paragraph that ends
/// at the next block-level child.
fn collect_blocks(element: ElementRef<'_>, out: &mut Vec<Block>) {
    let mut run = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => run.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if EXCLUDED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    run.push('\n');
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if INLINE_TAGS.contains(&name) {
                    run.push_str(&raw_visible_text(child));
                    continue;
                }

                flush_run(&mut run, out);
                let level = heading_level(name);
                if level.is_some() || TEXT_BLOCK_TAGS.contains(&name) {
                    out.extend(Block::from_raw(&raw_visible_text(child), level));
                } else {
                    collect_blocks(child, out);
                }
            }
            _ => {}
        }
    }
    flush_run(&mut run, out);
}

fn flush_run(run: &mut String, out: &mut Vec<Block>) {
    out.extend(Block::from_raw(run, None));
    run.clear();
}

/// Share of text-block characters that follow some heading.
#[allow(clippy::cast_precision_loss)]
fn heading_coverage(blocks: &[Block]) -> f64 {
    let mut seen_heading = false;
    let mut covered = 0;
    let mut total = 0;
    for block in blocks {
        if block.is_heading() {
            seen_heading = true;
            continue;
        }
        let chars = block.text.chars().count();
        total += chars;
        if seen_heading {
            covered += chars;
        }
    }
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Estimated tokens of blocks joined into one chunk text.
fn joined_tokens(blocks: &[Block]) -> usize {
    let chars: usize = blocks.iter().map(|block| block.text.chars().count()).sum();
    let separators = blocks.len().saturating_sub(1) * BLOCK_SEPARATOR.len();
    (chars + separators).div_ceil(CHARS_PER_TOKEN)
}

type Span = (Option<String>, Range<usize>);

fn heading_spans(blocks: &[Block], budget: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    let first_heading = blocks
        .iter()
        .position(Block::is_heading)
        .unwrap_or(blocks.len());
    if first_heading > 0 {
        spans.push((None, 0..first_heading));
    }
    split_sections(blocks, first_heading..blocks.len(), budget, &mut spans);
    spans
}

/// Emit the sections starting in `range`. Each section runs from a heading to
/// the next heading of the same or a higher level. A section over budget
/// emits its heading and lead content, then recurses into its subsections.
fn split_sections(blocks: &[Block], range: Range<usize>, budget: usize, spans: &mut Vec<Span>) {
    let end = range.end;
    let mut i = range.start;
    while i < end {
        let Some(level) = blocks[i].level else {
            spans.push((None, i..i + 1));
            i += 1;
            continue;
        };
        let section_end = (i + 1..end)
            .find(|&j| blocks[j].level.is_some_and(|l| l <= level))
            .unwrap_or(end);
        let heading = Some(blocks[i].text.clone());
        let first_subsection = (i + 1..section_end).find(|&j| blocks[j].is_heading());

        match first_subsection {
            Some(sub) if joined_tokens(&blocks[i..section_end]) > budget => {
                spans.push((heading, i..sub));
                split_sections(blocks, sub..section_end, budget, spans);
            }
            _ => spans.push((heading, i..section_end)),
        }
        i = section_end;
    }
}

fn paragraph_spans(blocks: &[Block], budget: usize) -> Vec<Span> {
    let first_heading = |range: &Range<usize>| {
        blocks[range.clone()]
            .iter()
            .find(|block| block.is_heading())
            .map(|block| block.text.clone())
    };

    let mut spans = Vec::new();
    let mut start = 0;
    for end in 1..=blocks.len() {
        if joined_tokens(&blocks[start..end]) >= budget {
            let range = start..end;
            spans.push((first_heading(&range), range));
            start = end;
        }
    }
    if start < blocks.len() {
        let range = start..blocks.len();
        spans.push((first_heading(&range), range));
    }
    spans
}
