// ABOUTME: Extraction strategies run by the engine over a parsed document.
// ABOUTME: Includes link, main-field, paragraph, and table extractors plus shared selector helpers.

//! Extraction module.
//!
//! Each extractor reads the same document independently; the engine merges
//! their output.
//!
//! Submodules:
//! - `links`: outbound link discovery and validation.
//! - `main_fields`: prioritized structural selectors for high-value fields.
//! - `paragraphs`: fuzzy-matched `Label: value` paragraph fragments.
//! - `tables`: header-mapped table rows.
//! - `compiled`: process-wide compiled selector cache.
//! - `select`: selector specs and text helpers.

pub mod compiled;
pub mod links;
pub mod main_fields;
pub mod paragraphs;
pub mod select;
pub mod tables;
