// ABOUTME: Configuration options for the extraction engine including Options, MainFieldRule, and EngineBuilder.
// ABOUTME: EngineBuilder provides a fluent API for constructing ExtractorEngine instances with custom settings.

use serde::{Deserialize, Serialize};

use crate::engine::ExtractorEngine;
use crate::error::ExtractError;
use crate::extractors::compiled::precompile_selectors;
use crate::extractors::select::SelectorSpec;
use crate::matching::schema::FieldMapping;
use crate::matching::similarity::Similarity;

/// Prioritized anchor containers tried before the generic anchor fallback.
const DEFAULT_LINK_SELECTORS: &[&str] = &[
    "div.item a[href]",
    "div.card a[href]",
    "div.movie a[href]",
    "div.movie-entry a[href]",
    "div.movie-card a[href]",
    "article a[href]",
];

const DEFAULT_INVALID_LINK_PATTERNS: &[&str] =
    &["javascript:", "mailto:", "tel:", "data:", "void(0)"];

/// Ordered structural selectors for one high-value field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainFieldRule {
    pub field: String,
    /// Most specific first.
    pub selectors: Vec<SelectorSpec>,
}

impl MainFieldRule {
    pub fn new<I, S>(field: impl Into<String>, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectorSpec>,
    {
        Self {
            field: field.into(),
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_main_fields() -> Vec<MainFieldRule> {
    vec![
        MainFieldRule::new(
            "title",
            ["h1.entry-title", "h1.title", "div.movie-title"],
        ),
        MainFieldRule::new("year", [".ytps", "span[class*=\"year\"]"]),
        MainFieldRule::new("poster_url", [("div.entry-content img", "src")]),
        MainFieldRule::new("streaming_link", [("iframe", "src")]),
    ]
}

/// Tunables for every extractor the engine drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Case-insensitive patterns that disqualify a link. Patterns ending in `:`
    /// match as a prefix of the raw href; others as a substring of the raw
    /// href or the resolved URL.
    pub invalid_link_patterns: Vec<String>,
    /// Anchor selectors unioned with the generic `a[href]` fallback.
    pub link_selectors: Vec<String>,
    pub paragraph_selector: String,
    pub paragraph_min_chars: usize,
    pub paragraph_max_chars: usize,
    /// A paragraph match must score strictly above this.
    pub paragraph_threshold: u8,
    pub table_selector: String,
    pub main_fields: Vec<MainFieldRule>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            invalid_link_patterns: DEFAULT_INVALID_LINK_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            link_selectors: DEFAULT_LINK_SELECTORS.iter().map(|s| s.to_string()).collect(),
            paragraph_selector: "p".to_string(),
            paragraph_min_chars: 5,
            paragraph_max_chars: 200,
            paragraph_threshold: 70,
            table_selector: "table".to_string(),
            main_fields: default_main_fields(),
        }
    }
}

impl Options {
    /// Parses options from JSON; omitted keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(json).map_err(|e| {
            ExtractError::initialization(
                "Options",
                Some(anyhow::anyhow!("invalid options JSON: {}", e)),
            )
        })
    }

    fn validate(&self) -> Result<(), ExtractError> {
        if self.paragraph_min_chars > self.paragraph_max_chars {
            return Err(ExtractError::initialization(
                "Options",
                Some(anyhow::anyhow!(
                    "paragraph_min_chars {} exceeds paragraph_max_chars {}",
                    self.paragraph_min_chars,
                    self.paragraph_max_chars
                )),
            ));
        }
        if self.paragraph_threshold > 100 {
            return Err(ExtractError::initialization(
                "Options",
                Some(anyhow::anyhow!(
                    "paragraph_threshold {} is outside 0..=100",
                    self.paragraph_threshold
                )),
            ));
        }

        let selectors = self
            .link_selectors
            .iter()
            .map(String::as_str)
            .chain([self.paragraph_selector.as_str(), self.table_selector.as_str()])
            .chain(
                self.main_fields
                    .iter()
                    .flat_map(|r| r.selectors.iter().map(SelectorSpec::css)),
            );
        for css in precompile_selectors(selectors) {
            // Reported again, as a typed error, when the selector is used.
            tracing::warn!(selector = %css, "Configured selector does not compile");
        }
        Ok(())
    }
}

/// Builder for constructing ExtractorEngine instances with custom configuration.
pub struct EngineBuilder {
    opts: Options,
    similarity: Option<Box<dyn Similarity>>,
}

impl EngineBuilder {
    /// Create a new EngineBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
            similarity: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Add a pattern to the link blocklist.
    pub fn invalid_link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.opts.invalid_link_patterns.push(pattern.into());
        self
    }

    /// Replace the link blocklist.
    pub fn invalid_link_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.invalid_link_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the selector choosing paragraph-like elements.
    pub fn paragraph_selector(mut self, css: impl Into<String>) -> Self {
        self.opts.paragraph_selector = css.into();
        self
    }

    /// Set the inclusive character bounds for paragraph fragments.
    pub fn paragraph_bounds(mut self, min_chars: usize, max_chars: usize) -> Self {
        self.opts.paragraph_min_chars = min_chars;
        self.opts.paragraph_max_chars = max_chars;
        self
    }

    /// Set the score a paragraph match must exceed.
    pub fn paragraph_threshold(mut self, threshold: u8) -> Self {
        self.opts.paragraph_threshold = threshold;
        self
    }

    /// Set the selector choosing tables.
    pub fn table_selector(mut self, css: impl Into<String>) -> Self {
        self.opts.table_selector = css.into();
        self
    }

    /// Replace the main field rules.
    pub fn main_fields(mut self, rules: Vec<MainFieldRule>) -> Self {
        self.opts.main_fields = rules;
        self
    }

    /// Use a custom similarity scorer instead of `WeightedRatio`.
    pub fn similarity(mut self, similarity: Box<dyn Similarity>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Build the engine for `mapping` with the configured options.
    pub fn build(self, mapping: FieldMapping) -> Result<ExtractorEngine, ExtractError> {
        if mapping.is_empty() {
            return Err(ExtractError::initialization(
                "EngineBuilder",
                Some(anyhow::anyhow!("field mapping is empty")),
            ));
        }
        self.opts.validate()?;
        Ok(ExtractorEngine::from_parts(mapping, self.opts, self.similarity))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
