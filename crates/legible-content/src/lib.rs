//! Legible Content - How the page's text looks to a token-limited reader.
//!
//! Two independent analyses over a [`DocumentSnapshot`](legible_document::DocumentSnapshot):
//!
//! - [`chunker`]: splits the visible text into budget-sized chunks and rates
//!   each one
//! - [`extractability`]: estimates whether each content region is readable
//!   without running scripts
//!
//! # Example
//!
//! ```rust
//! use legible_content::{ChunkStrategy, ContentChunker, ExtractabilityMapper};
//! use legible_core::ScanConfig;
//! use legible_document::DocumentSnapshot;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = DocumentSnapshot::parse(
//!     "https://example.com",
//!     "<html><body><main><h1>Title</h1><p>Some text.</p></main></body></html>",
//!     None,
//! )?;
//! let config = ScanConfig::default();
//!
//! let chunks = ContentChunker::from_config(&config).chunk(&doc);
//! assert_eq!(chunks.strategy, ChunkStrategy::HeadingBased);
//!
//! let map = ExtractabilityMapper::from_config(&config).map(&doc)?;
//! assert_eq!(map.regions.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod chunker;
pub mod extractability;

// Re-export commonly used types
pub use chunker::{
    estimate_tokens, noise_ratio, ChunkQuality, ChunkStrategy, ChunkingResult, ContentChunk,
    ContentChunker, QualityIssue,
};
pub use extractability::{
    detect_hydration_markers, ExtractabilityLevel, ExtractabilityMap, ExtractabilityMapper,
    RegionExtractability,
};
