//! Legible Document - Immutable snapshot of one parsed page.
//!
//! A [`DocumentSnapshot`] bundles the fetch metadata (URL, raw markup, optional
//! HTTP status) with a parsed tree that supports selector queries, attribute
//! access and visible-text extraction. Snapshots are built once per scan and
//! shared read-only by every analysis stage.
//!
//! # Example
//!
//! ```rust
//! use legible_document::DocumentSnapshot;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = DocumentSnapshot::parse(
//!     "https://example.com/guide",
//!     "<html><head><title>Guide</title></head><body><h1>Guide</h1></body></html>",
//!     Some(200),
//! )?;
//!
//! assert_eq!(doc.title().as_deref(), Some("Guide"));
//! assert_eq!(doc.headings().len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod snapshot;
pub mod text;

// Re-export commonly used types
pub use error::{DocumentError, Result};
pub use scraper::ElementRef;
pub use snapshot::{heading_level, DocumentSnapshot, Heading};
pub use text::{normalize_whitespace, raw_visible_text, visible_text, word_count, SKIPPED_TAGS};
