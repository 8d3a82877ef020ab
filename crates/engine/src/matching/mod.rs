// ABOUTME: Schema-driven fuzzy matching of text fragments and table headers to canonical fields.
// ABOUTME: Groups the schema, similarity scorer, memoized matcher, header mapper, cleaner, and loader.

//! Matching module.
//!
//! Submodules:
//! - `schema`: the validated field mapping (labels and thresholds per field).
//! - `similarity`: the `Similarity` trait and the default `WeightedRatio` scorer.
//! - `matcher`: `FieldMatcher`, memoized text-to-field resolution.
//! - `header`: `HeaderMapper`, memoized table header resolution.
//! - `cleaner`: `TextCleaner`, `label: value` normalization.
//! - `loader`: loading schemas by content type from JSON.

pub mod cleaner;
pub mod header;
pub mod loader;
pub mod matcher;
pub mod schema;
pub mod similarity;
