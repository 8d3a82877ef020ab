// ABOUTME: Loader for field mapping schemas keyed by content type, from JSON text or embedded data.
// ABOUTME: Provides load_field_mapping() and load_builtin_mapping() returning validated FieldMappings.

//! Field mapping loader.
//!
//! Schemas are grouped by content type in a single JSON document:
//!
//! ```json
//! { "content_types": { "movies": { "title": { "labels": ["Title"] } } } }
//! ```
//!
//! The engine never reads configuration itself; callers load a mapping here
//! (or build one in code) and hand it to the engine at construction.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ExtractError;
use crate::matching::schema::FieldMapping;

/// Embedded JSON containing the builtin schemas.
const BUILTIN_MAPPING_JSON: &str = include_str!("../../data/field_mapping.json");

#[derive(Debug, Deserialize)]
struct MappingFile {
    content_types: BTreeMap<String, FieldMapping>,
}

/// Loads the schema for `content_type` from a mapping document.
///
/// Every content type in the document is validated; an unknown content type
/// is an `Initialization` error naming the available ones.
pub fn load_field_mapping(json: &str, content_type: &str) -> Result<FieldMapping, ExtractError> {
    let file: MappingFile = serde_json::from_str(json).map_err(|e| {
        ExtractError::initialization(
            "LoadFieldMapping",
            Some(anyhow::anyhow!("invalid mapping document: {}", e)),
        )
    })?;

    let available: Vec<String> = file.content_types.keys().cloned().collect();
    let mut content_types = file.content_types;
    content_types.remove(content_type).ok_or_else(|| {
        ExtractError::initialization(
            "LoadFieldMapping",
            Some(anyhow::anyhow!(
                "unknown content type; available types: {}",
                available.join(", ")
            )),
        )
        .with_element(content_type)
    })
}

/// Loads a builtin schema (`movies` or `music`) from embedded JSON.
pub fn load_builtin_mapping(content_type: &str) -> Result<FieldMapping, ExtractError> {
    load_field_mapping(BUILTIN_MAPPING_JSON, content_type)
}
