//! Scan configuration.
//!
//! Every threshold the pipeline uses lives in [`ScanConfig`], which is passed
//! explicitly to each scan. Configurations can be built in code, parsed from
//! TOML, or loaded from a file the caller names. Nothing is read implicitly.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Category, Severity, MAX_IMPACT_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Relative weight of each category in the overall score
    pub category_weights: BTreeMap<Category, f64>,
    /// Impact applied to an issue of each severity unless the rule overrides it
    pub severity_impact_defaults: BTreeMap<Severity, f64>,
    /// Token budget for a single content chunk
    pub chunk_token_budget: usize,
    /// Heading coverage above which heading-based chunking is used
    pub heading_coverage_threshold: f64,
    /// Noise ratio above which a chunk is flagged as noisy
    pub noise_ratio_threshold: f64,
    /// Deadline for the whole scan in milliseconds
    pub overall_timeout_ms: u64,
    /// Maximum number of rules evaluated concurrently (defaults to available parallelism)
    pub max_concurrent_rules: Option<usize>,
    /// Extractability policy
    pub extractability: ExtractabilityConfig,
    /// Thresholds consumed by individual checks
    pub thresholds: RuleThresholds,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let category_weights = [
            (Category::StructuredData, 1.2),
            (Category::Metadata, 1.0),
            (Category::ContentStructure, 1.2),
            (Category::Accessibility, 0.8),
            (Category::Crawlability, 1.5),
            (Category::Readability, 0.8),
        ]
        .into_iter()
        .collect();

        let severity_impact_defaults = Severity::ALL
            .iter()
            .map(|severity| (*severity, severity.default_impact()))
            .collect();

        Self {
            category_weights,
            severity_impact_defaults,
            chunk_token_budget: 400,
            heading_coverage_threshold: 0.5,
            noise_ratio_threshold: 0.5,
            overall_timeout_ms: 30_000,
            max_concurrent_rules: None,
            extractability: ExtractabilityConfig::default(),
            thresholds: RuleThresholds::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from TOML and validate it.
    ///
    /// Sections that are absent fall back to defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns error if:
    /// - The file does not exist or cannot be read
    /// - File contents are not valid TOML
    /// - Any value fails validation
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading scan config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Apply environment variable overrides and re-validate.
    ///
    /// Only called when the caller opts in. Supports:
    /// - `LEGIBLE_OVERALL_TIMEOUT_MS`: Override the scan deadline
    /// - `LEGIBLE_CHUNK_TOKEN_BUDGET`: Override the chunk token budget
    /// - `LEGIBLE_MAX_CONCURRENT_RULES`: Override rule concurrency
    pub fn with_env_overrides(mut self) -> ConfigResult<Self> {
        if let Ok(val) = std::env::var("LEGIBLE_OVERALL_TIMEOUT_MS") {
            self.overall_timeout_ms = val.parse().map_err(|_| {
                ConfigError::invalid("overall_timeout_ms", format!("not an integer: '{val}'"))
            })?;
            tracing::debug!("Override overall_timeout_ms from env: {}", self.overall_timeout_ms);
        }

        if let Ok(val) = std::env::var("LEGIBLE_CHUNK_TOKEN_BUDGET") {
            self.chunk_token_budget = val.parse().map_err(|_| {
                ConfigError::invalid("chunk_token_budget", format!("not an integer: '{val}'"))
            })?;
            tracing::debug!("Override chunk_token_budget from env: {}", self.chunk_token_budget);
        }

        if let Ok(val) = std::env::var("LEGIBLE_MAX_CONCURRENT_RULES") {
            let max: usize = val.parse().map_err(|_| {
                ConfigError::invalid("max_concurrent_rules", format!("not an integer: '{val}'"))
            })?;
            self.max_concurrent_rules = Some(max);
            tracing::debug!("Override max_concurrent_rules from env: {}", max);
        }

        self.validate()?;
        Ok(self)
    }

    /// Serialize the configuration to pretty TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject invalid weights, negative thresholds and non-positive budgets.
    pub fn validate(&self) -> ConfigResult<()> {
        for (category, weight) in &self.category_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::invalid(
                    format!("category_weights.{category}"),
                    format!("must be a finite, non-negative number, got {weight}"),
                ));
            }
        }
        if !self.category_weights.is_empty()
            && self.category_weights.values().all(|weight| *weight == 0.0)
        {
            return Err(ConfigError::invalid(
                "category_weights",
                "at least one category must carry a positive weight",
            ));
        }

        for (severity, impact) in &self.severity_impact_defaults {
            if !impact.is_finite() || !(0.0..=MAX_IMPACT_SCORE).contains(impact) {
                return Err(ConfigError::invalid(
                    format!("severity_impact_defaults.{severity}"),
                    format!("must lie within [0, {MAX_IMPACT_SCORE}], got {impact}"),
                ));
            }
        }

        if self.chunk_token_budget == 0 {
            return Err(ConfigError::invalid(
                "chunk_token_budget",
                "must be greater than zero",
            ));
        }

        check_fraction("heading_coverage_threshold", self.heading_coverage_threshold)?;
        check_fraction("noise_ratio_threshold", self.noise_ratio_threshold)?;

        if self.overall_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "overall_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.max_concurrent_rules == Some(0) {
            return Err(ConfigError::invalid(
                "max_concurrent_rules",
                "must be greater than zero when set",
            ));
        }

        self.thresholds.validate()
    }

    /// Weight of a category; categories not listed weigh 1.0.
    #[must_use]
    pub fn weight_for(&self, category: Category) -> f64 {
        self.category_weights.get(&category).copied().unwrap_or(1.0)
    }

    /// Default impact of a severity; severities not listed use the built-in table.
    #[must_use]
    pub fn impact_for(&self, severity: Severity) -> f64 {
        self.severity_impact_defaults
            .get(&severity)
            .copied()
            .unwrap_or_else(|| severity.default_impact())
    }

    /// The scan deadline as a `Duration`.
    #[must_use]
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    /// Rule concurrency, falling back to the machine's available parallelism.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_rules.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4)
        })
    }
}

fn check_fraction(field: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must lie within [0, 1], got {value}"),
        ))
    }
}

/// Extractability policy thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractabilityConfig {
    /// Static text (characters) below which a region counts as empty
    pub static_text_floor: usize,
    /// Script-loading elements above which an empty region counts as client-rendered
    pub script_ceiling: usize,
}

impl Default for ExtractabilityConfig {
    fn default() -> Self {
        Self {
            static_text_floor: 200,
            script_ceiling: 10,
        }
    }
}

/// Thresholds consumed by individual checks.
///
/// These heuristics have no calibration data behind them; they are
/// configuration so they can be re-tuned without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Pages with fewer words are reported as thin
    pub min_word_count: usize,
    /// Approximate Flesch-Kincaid grade above which text is hard to read
    pub max_reading_grade: f64,
    /// Average words per sentence above which sentences are too long
    pub max_avg_sentence_words: f64,
    /// Maximum nesting depth followed when walking JSON-LD
    pub max_jsonld_depth: usize,
    /// Titles shorter than this carry little meaning
    pub min_title_chars: usize,
    /// Titles longer than this are truncated by search and answer engines
    pub max_title_chars: usize,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            min_word_count: 300,
            max_reading_grade: 12.0,
            max_avg_sentence_words: 25.0,
            max_jsonld_depth: 16,
            min_title_chars: 10,
            max_title_chars: 70,
        }
    }
}

impl RuleThresholds {
    fn validate(&self) -> ConfigResult<()> {
        if !self.max_reading_grade.is_finite() || self.max_reading_grade <= 0.0 {
            return Err(ConfigError::invalid(
                "thresholds.max_reading_grade",
                format!("must be positive, got {}", self.max_reading_grade),
            ));
        }
        if !self.max_avg_sentence_words.is_finite() || self.max_avg_sentence_words <= 0.0 {
            return Err(ConfigError::invalid(
                "thresholds.max_avg_sentence_words",
                format!("must be positive, got {}", self.max_avg_sentence_words),
            ));
        }
        if self.max_jsonld_depth == 0 {
            return Err(ConfigError::invalid(
                "thresholds.max_jsonld_depth",
                "must be greater than zero",
            ));
        }
        if self.min_title_chars > self.max_title_chars {
            return Err(ConfigError::invalid(
                "thresholds.min_title_chars",
                format!(
                    "must not exceed max_title_chars ({}), got {}",
                    self.max_title_chars, self.min_title_chars
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.chunk_token_budget, 400);
        assert_eq!(config.overall_timeout_ms, 30_000);
        assert_eq!(config.category_weights.len(), Category::ALL.len());
        assert!((config.impact_for(Severity::Critical) - 25.0).abs() < f64::EPSILON);
        assert!(config.effective_concurrency() >= 1);
    }

    #[test]
    fn test_config_serialization() {
        let config = ScanConfig::default();
        let toml_str = config.to_toml_string().expect("serialize default config");
        assert!(toml_str.contains("[category_weights]"));
        assert!(toml_str.contains("[extractability]"));
        assert!(toml_str.contains("[thresholds]"));

        let parsed = ScanConfig::from_toml_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.chunk_token_budget, config.chunk_token_budget);
        assert_eq!(parsed.category_weights, config.category_weights);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("legible.toml");

        let mut config = ScanConfig::default();
        config.chunk_token_budget = 250;
        config.thresholds.min_word_count = 120;
        fs::write(&config_path, config.to_toml_string().expect("serialize config"))
            .expect("write config file");

        let loaded = ScanConfig::load(&config_path).expect("load config");
        assert_eq!(loaded.chunk_token_budget, 250);
        assert_eq!(loaded.thresholds.min_word_count, 120);
    }

    #[test]
    fn test_config_load_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = ScanConfig::load(tmp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
chunk_token_budget = 320

[category_weights]
crawlability = 2.0

[extractability]
script_ceiling = 5
"#;

        let config = ScanConfig::from_toml_str(toml_str).expect("parse partial config");
        assert_eq!(config.chunk_token_budget, 320);
        assert!((config.weight_for(Category::Crawlability) - 2.0).abs() < f64::EPSILON);
        // Unlisted categories weigh 1.0
        assert!((config.weight_for(Category::Metadata) - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.extractability.script_ceiling, 5);
        assert_eq!(config.extractability.static_text_floor, 200);
    }

    #[test]
    fn test_rejects_zero_budget() {
        let config = ScanConfig {
            chunk_token_budget: 0,
            ..ScanConfig::default()
        };
        let err = config.validate().expect_err("zero budget rejected");
        assert!(err.to_string().contains("chunk_token_budget"));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = ScanConfig::default();
        config.category_weights.insert(Category::Metadata, -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_all_zero_weights() {
        let mut config = ScanConfig::default();
        for weight in config.category_weights.values_mut() {
            *weight = 0.0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        let config = ScanConfig {
            noise_ratio_threshold: -0.1,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScanConfig {
            heading_coverage_threshold: f64::NAN,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.severity_impact_defaults.insert(Severity::High, 75.0);
        assert!(config.validate().is_err());

        let config = ScanConfig {
            overall_timeout_ms: 0,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScanConfig {
            max_concurrent_rules: Some(0),
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.thresholds.min_title_chars = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let result = ScanConfig::from_toml_str("chunk_token_budget = 0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ScanConfig::from_toml_str("chunk_token_budget = \"lots\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("LEGIBLE_CHUNK_TOKEN_BUDGET", "128");
        std::env::set_var("LEGIBLE_MAX_CONCURRENT_RULES", "2");

        let config = ScanConfig::default()
            .with_env_overrides()
            .expect("apply env overrides");
        assert_eq!(config.chunk_token_budget, 128);
        assert_eq!(config.effective_concurrency(), 2);

        std::env::remove_var("LEGIBLE_CHUNK_TOKEN_BUDGET");
        std::env::remove_var("LEGIBLE_MAX_CONCURRENT_RULES");
    }
}
