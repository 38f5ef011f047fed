//! Whether content survives without running scripts.
//!
//! Each primary content region (`main`, `article`, `[role="main"]`, or the
//! body when none exist) is rated from its static text length, the number of
//! external scripts, and any client-hydration markers in the page:
//!
//! | static text       | scripts   | hydration marker | level     |
//! |-------------------|-----------|------------------|-----------|
//! | below floor       | > ceiling | any              | `none`    |
//! | below floor       | any       | present          | `none`    |
//! | at or above floor | any       | present          | `partial` |
//! | otherwise         |           |                  | `full`    |

use legible_core::ScanConfig;
use legible_document::{visible_text, DocumentSnapshot, ElementRef, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const REGION_SELECTORS: &[&str] = &["main", "article", r#"[role="main"]"#];

/// Globals and ids written into inline scripts by hydrating frameworks.
const SCRIPT_MARKERS: &[&str] = &[
    "__NEXT_DATA__",
    "__NUXT__",
    "window.__INITIAL_STATE__",
    "window.__APOLLO_STATE__",
];

/// `(selector, marker name)` for attribute-based markers.
const ATTRIBUTE_MARKERS: &[(&str, &str)] = &[
    ("[data-reactroot]", "data-reactroot"),
    ("[data-server-rendered]", "data-server-rendered"),
    ("[ng-version]", "ng-version"),
    (r#"script[id="ng-state"]"#, "ng-state"),
    ("[data-hydrate]", "data-hydrate"),
];

/// Single-page-app mount points that are empty until scripts run.
const MOUNT_NODES: &[&str] = &["#root", "#app", "#__next", "#__nuxt"];

/// How much of a region a non-rendering agent can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractabilityLevel {
    /// Text is in the delivered markup
    Full,
    /// Text is present but tied to client hydration
    Partial,
    /// Text only appears after client-side rendering
    None,
}

/// Rating of one content region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionExtractability {
    /// Region identity: selector and ordinal, such as `main[0]`, or `body`
    pub content_source: String,
    /// The rating
    pub level: ExtractabilityLevel,
    /// Why the region got its rating
    pub reason: String,
    /// Characters of visible static text in the region
    pub static_text_chars: usize,
}

/// Ratings for every content region of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractabilityMap {
    /// One entry per region, grouped by selector in `main`, `article`, `[role="main"]` order
    pub regions: Vec<RegionExtractability>,
    /// Whether any region is not `full`
    pub has_client_only_content: bool,
    /// `script[src]` elements in the document
    pub script_count: usize,
    /// Hydration markers found, in detection order
    pub hydration_markers: Vec<String>,
}

impl ExtractabilityMap {
    /// Level of a region by its content source.
    #[must_use]
    pub fn level_of(&self, content_source: &str) -> Option<ExtractabilityLevel> {
        self.regions
            .iter()
            .find(|region| region.content_source == content_source)
            .map(|region| region.level)
    }

    /// The least extractable level across regions.
    #[must_use]
    pub fn worst_level(&self) -> Option<ExtractabilityLevel> {
        self.regions.iter().map(|region| region.level).max()
    }
}

/// Rates content regions with configured thresholds.
#[derive(Debug, Clone)]
pub struct ExtractabilityMapper {
    static_text_floor: usize,
    script_ceiling: usize,
}

impl ExtractabilityMapper {
    /// Create a mapper with explicit thresholds.
    #[must_use]
    pub fn new(static_text_floor: usize, script_ceiling: usize) -> Self {
        Self {
            static_text_floor,
            script_ceiling,
        }
    }

    /// Create a mapper from a scan configuration.
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.extractability.static_text_floor,
            config.extractability.script_ceiling,
        )
    }

    /// Rate every content region of the snapshot.
    pub fn map(&self, document: &DocumentSnapshot) -> Result<ExtractabilityMap> {
        let script_count = document.count("script[src]")?;
        let hydration_markers = detect_hydration_markers(document)?;

        let regions: Vec<RegionExtractability> = content_regions(document)?
            .into_iter()
            .map(|(content_source, element)| {
                let static_text_chars = visible_text(element).chars().count();
                self.rate(content_source, static_text_chars, script_count, &hydration_markers)
            })
            .collect();

        let has_client_only_content = regions
            .iter()
            .any(|region| region.level != ExtractabilityLevel::Full);

        debug!(
            regions = regions.len(),
            script_count,
            markers = hydration_markers.len(),
            has_client_only_content,
            "mapped extractability"
        );

        Ok(ExtractabilityMap {
            regions,
            has_client_only_content,
            script_count,
            hydration_markers,
        })
    }

    fn rate(
        &self,
        content_source: String,
        static_text_chars: usize,
        script_count: usize,
        markers: &[String],
    ) -> RegionExtractability {
        let below_floor = static_text_chars < self.static_text_floor;
        let hydrated = !markers.is_empty();

        let (level, reason) = if below_floor && script_count > self.script_ceiling {
            (
                ExtractabilityLevel::None,
                format!(
                    "{static_text_chars} characters of static text with {script_count} external scripts"
                ),
            )
        } else if below_floor && hydrated {
            (
                ExtractabilityLevel::None,
                format!(
                    "{static_text_chars} characters of static text with hydration markers: {}",
                    markers.join(", ")
                ),
            )
        } else if hydrated {
            (
                ExtractabilityLevel::Partial,
                format!(
                    "static text present alongside hydration markers: {}",
                    markers.join(", ")
                ),
            )
        } else {
            (
                ExtractabilityLevel::Full,
                format!("{static_text_chars} characters of static text"),
            )
        };

        RegionExtractability {
            content_source,
            level,
            reason,
            static_text_chars,
        }
    }
}

/// Hydration markers present in the snapshot, each reported once.
pub fn detect_hydration_markers(document: &DocumentSnapshot) -> Result<Vec<String>> {
    let mut markers = Vec::new();

    let mut script_text = String::new();
    for script in document.select("script")? {
        if let Some(id) = script.value().attr("id") {
            script_text.push_str(id);
            script_text.push('\n');
        }
        script_text.push_str(&script.inner_html());
        script_text.push('\n');
    }
    for marker in SCRIPT_MARKERS {
        if script_text.contains(marker) {
            markers.push((*marker).to_string());
        }
    }

    for (selector, name) in ATTRIBUTE_MARKERS {
        if document.exists(selector)? {
            markers.push((*name).to_string());
        }
    }

    for selector in MOUNT_NODES {
        let empty_mount = document
            .select(selector)?
            .into_iter()
            .any(|node| visible_text(node).is_empty());
        if empty_mount {
            markers.push(format!("empty {selector} mount"));
        }
    }

    Ok(markers)
}

/// Primary content regions with their identities; the body if none exist.
fn content_regions(document: &DocumentSnapshot) -> Result<Vec<(String, ElementRef<'_>)>> {
    let mut seen = HashSet::new();
    let mut regions = Vec::new();
    for selector in REGION_SELECTORS {
        for (ordinal, element) in document.select(selector)?.into_iter().enumerate() {
            if seen.insert(element.id()) {
                regions.push((format!("{selector}[{ordinal}]"), element));
            }
        }
    }

    if regions.is_empty() {
        if let Some(body) = document.body() {
            regions.push(("body".to_string(), body));
        }
    }
    Ok(regions)
}
