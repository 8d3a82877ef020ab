// ABOUTME: Main library entry point for the fieldscope heuristic field-extraction engine.
// ABOUTME: Re-exports the public API: ExtractorEngine, EngineBuilder, Document, ExtractionResult, ExtractError.

//! fieldscope - schema-driven field extraction from already-fetched HTML.
//!
//! Given a parsed document and its URL, the engine derives a record of
//! canonical fields (title, year, director, ...) without per-site rules, by
//! fuzzy-matching labels found in paragraphs and table headers against a
//! configurable schema. It also collects outbound links and table rows.
//!
//! # Example
//!
//! ```
//! use fieldscope_engine::{load_builtin_mapping, ExtractError, ExtractorEngine};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let engine = ExtractorEngine::new(load_builtin_mapping("movies")?)?;
//!     let result = engine.extract_html(
//!         "<html><body><h1 class='entry-title'>Inception</h1>\
//!          <p>Director: Christopher Nolan</p></body></html>",
//!         "https://example.com/movies/inception",
//!     )?;
//!     assert_eq!(result.field("director"), Some("Christopher Nolan"));
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod matching;
pub mod options;
pub mod result;

pub use crate::document::Document;
pub use crate::engine::ExtractorEngine;
pub use crate::error::{ErrorKind, ExtractError};
pub use crate::extractors::links::{LinkExtractor, LinkRejection};
pub use crate::extractors::main_fields::MainFieldExtractor;
pub use crate::extractors::paragraphs::ParagraphExtractor;
pub use crate::extractors::select::SelectorSpec;
pub use crate::extractors::tables::{TableExtractor, TableRows};
pub use crate::matching::cleaner::TextCleaner;
pub use crate::matching::header::{HeaderMapper, HeaderMapping};
pub use crate::matching::loader::{load_builtin_mapping, load_field_mapping};
pub use crate::matching::matcher::{FieldMatcher, MatchResult};
pub use crate::matching::schema::{FieldMapping, FieldSpec, DEFAULT_CONFIDENCE_THRESHOLD};
pub use crate::matching::similarity::{Similarity, WeightedRatio};
pub use crate::options::{EngineBuilder, MainFieldRule, Options};
pub use crate::result::{ExtractionResult, FieldMap, Record};
