// ABOUTME: Memoized fuzzy matcher resolving a text fragment to the best canonical field.
// ABOUTME: Scores every schema field's labels, honours per-field thresholds, caches by lowercase text.

//! Field matching against a [`FieldMapping`].
//!
//! Key behaviors:
//! - Matching is case-insensitive; the cache is keyed by the lowercased text.
//! - A field is a candidate only when its best label score reaches its own threshold.
//! - The strictly highest candidate wins; equal top scores go to the field
//!   declared first in the schema.
//! - No match yields `MatchResult::none()`; it is cached like any other result.
//!
//! The cache uses `RefCell`, so a matcher is `!Sync`: give each worker its own
//! instance or wrap it in external synchronization.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{preview, ExtractError};
use crate::matching::schema::{FieldMapping, FieldRule};
use crate::matching::similarity::{Similarity, WeightedRatio};

/// Outcome of matching one fragment: the winning field, if any, and its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub field: Option<String>,
    pub score: u8,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            field: None,
            score: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.field.is_some()
    }
}

pub struct FieldMatcher {
    mapping: FieldMapping,
    similarity: Box<dyn Similarity>,
    cache: RefCell<HashMap<String, MatchResult>>,
    scoring_passes: Cell<usize>,
}

impl FieldMatcher {
    /// Creates a matcher using the default [`WeightedRatio`] scorer.
    pub fn new(mapping: FieldMapping) -> Self {
        Self::with_similarity(mapping, Box::new(WeightedRatio))
    }

    pub fn with_similarity(mapping: FieldMapping, similarity: Box<dyn Similarity>) -> Self {
        Self {
            mapping,
            similarity,
            cache: RefCell::new(HashMap::new()),
            scoring_passes: Cell::new(0),
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Matches `text` to the best canonical field.
    ///
    /// Returns a `Processing` error only when the schema state is unusable,
    /// such as a rule without labels or a scorer returning more than 100.
    pub fn match_text(&self, text: &str) -> Result<MatchResult, ExtractError> {
        if text.trim().is_empty() {
            return Ok(MatchResult::none());
        }

        let key = text.to_lowercase();
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Ok(hit.clone());
        }

        self.scoring_passes.set(self.scoring_passes.get() + 1);
        let mut best = MatchResult::none();
        for rule in self.mapping.rules() {
            let score = self.best_label_score(rule, &key)?;
            // Strict comparison keeps the earlier declared field on ties.
            if score >= rule.threshold && score > best.score {
                best = MatchResult {
                    field: Some(rule.name.clone()),
                    score,
                };
            }
        }

        tracing::trace!(
            text = %preview(text),
            field = ?best.field,
            score = best.score,
            "Matched fragment"
        );
        self.cache.borrow_mut().insert(key, best.clone());
        Ok(best)
    }

    fn best_label_score(&self, rule: &FieldRule, text: &str) -> Result<u8, ExtractError> {
        if rule.labels.is_empty() {
            return Err(ExtractError::processing(
                "FieldMatcher",
                Some(anyhow::anyhow!("field reached scoring without labels")),
            )
            .with_element(&rule.name));
        }

        let mut best = 0u8;
        for label in &rule.labels {
            let score = self.similarity.score(text, label);
            if score > 100 {
                return Err(ExtractError::processing(
                    "FieldMatcher",
                    Some(anyhow::anyhow!(
                        "similarity score {} for label '{}' is out of range",
                        score,
                        label
                    )),
                )
                .with_element(&rule.name));
            }
            best = best.max(score);
        }
        Ok(best)
    }

    /// Number of times matching work ran, i.e. cache misses on non-empty text.
    pub fn scoring_passes(&self) -> usize {
        self.scoring_passes.get()
    }

    /// Number of distinct texts currently memoized.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl std::fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("fields", &self.mapping.len())
            .field("cached", &self.cached_len())
            .field("scoring_passes", &self.scoring_passes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::schema::FieldSpec;

    fn movie_mapping() -> FieldMapping {
        FieldMapping::from_entries([
            (
                "title",
                FieldSpec {
                    labels: vec!["Film Title".into(), "Movie Title".into()],
                    confidence_threshold: 80,
                },
            ),
            (
                "director",
                FieldSpec {
                    labels: vec!["Director".into(), "Directed By".into()],
                    confidence_threshold: 70,
                },
            ),
        ])
        .unwrap()
    }

    /// Returns the same score for every pair, so every field ties.
    struct Constant(u8);

    impl Similarity for Constant {
        fn score(&self, _a: &str, _b: &str) -> u8 {
            self.0
        }
    }

    #[test]
    fn exact_label_matches() {
        let matcher = FieldMatcher::new(movie_mapping());
        let result = matcher.match_text("Film Title").unwrap();
        assert_eq!(result.field.as_deref(), Some("title"));
        assert!(result.score >= 80);
    }

    #[test]
    fn fuzzy_label_matches() {
        let matcher = FieldMatcher::new(movie_mapping());
        let result = matcher.match_text("Film Titles").unwrap();
        assert_eq!(result.field.as_deref(), Some("title"));
        assert!(result.score >= 80);
    }

    #[test]
    fn unrelated_text_is_no_match() {
        let matcher = FieldMatcher::new(movie_mapping());
        let result = matcher.match_text("Something Completely Different").unwrap();
        assert_eq!(result, MatchResult::none());
    }

    #[test]
    fn empty_text_is_no_match_without_scoring() {
        let matcher = FieldMatcher::new(movie_mapping());
        assert_eq!(matcher.match_text("   ").unwrap(), MatchResult::none());
        assert_eq!(matcher.scoring_passes(), 0);
    }

    #[test]
    fn repeated_calls_are_idempotent_and_cached() {
        let matcher = FieldMatcher::new(movie_mapping());
        let first = matcher.match_text("Directed by").unwrap();
        let second = matcher.match_text("Directed by").unwrap();
        assert_eq!(first, second);
        assert_eq!(matcher.scoring_passes(), 1);
    }

    #[test]
    fn cache_is_case_insensitive() {
        let matcher = FieldMatcher::new(movie_mapping());
        let upper = matcher.match_text("DIRECTOR").unwrap();
        let lower = matcher.match_text("director").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(matcher.scoring_passes(), 1);
        assert_eq!(matcher.cached_len(), 1);
    }

    #[test]
    fn ties_resolve_to_declaration_order() {
        let matcher = FieldMatcher::with_similarity(movie_mapping(), Box::new(Constant(90)));
        let result = matcher.match_text("anything").unwrap();
        assert_eq!(result.field.as_deref(), Some("title"));
        assert_eq!(result.score, 90);
    }

    #[test]
    fn per_field_threshold_is_respected() {
        // 75 clears director (70) but not title (80)
        let matcher = FieldMatcher::with_similarity(movie_mapping(), Box::new(Constant(75)));
        let result = matcher.match_text("anything").unwrap();
        assert_eq!(result.field.as_deref(), Some("director"));
    }

    #[test]
    fn out_of_range_scorer_is_processing_error() {
        let matcher = FieldMatcher::with_similarity(movie_mapping(), Box::new(Constant(150)));
        let err = matcher.match_text("anything").unwrap_err();
        assert!(err.is_processing());
        assert_eq!(err.element.as_deref(), Some("title"));
    }
}
