// ABOUTME: Field mapping schema: canonical field names with their labels and confidence thresholds.
// ABOUTME: Preserves declaration order and validates uniqueness, labels, and threshold ranges.

//! The field mapping schema consulted by the fuzzy matcher.
//!
//! A mapping is a data table of `{field, labels, threshold}` rows. Every field
//! is scored the same way, so the matcher is extended by configuration alone.
//!
//! Key behaviors:
//! - Declaration order is preserved; it is the tie-break order for equal scores.
//! - `confidence_threshold` defaults to 70 when omitted. Any number in
//!   `[0, 100]` is accepted; a fractional threshold is met from the next
//!   whole score up, since scores are integers.
//! - Validation rejects empty schemas, duplicate or empty names, label lists
//!   that are empty or blank, and thresholds outside `[0, 100]`.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Threshold applied to fields that do not declare their own.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 70;

fn default_threshold() -> u8 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn deserialize_threshold<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !(0.0..=100.0).contains(&raw) {
        return Err(de::Error::custom(format!(
            "confidence_threshold {} is outside 0..=100",
            raw
        )));
    }
    Ok(raw.ceil() as u8)
}

/// Labels and threshold for one canonical field, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub labels: Vec<String>,
    #[serde(
        default = "default_threshold",
        deserialize_with = "deserialize_threshold"
    )]
    pub confidence_threshold: u8,
}

/// One validated schema row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    /// Labels lowercased and trimmed, blanks and duplicates removed, order kept.
    pub labels: Vec<String>,
    pub threshold: u8,
}

/// An ordered, validated mapping from canonical field name to its labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    rules: Vec<FieldRule>,
}

impl FieldMapping {
    /// Builds a mapping from `(name, spec)` pairs in declaration order.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = (S, FieldSpec)>,
        S: Into<String>,
    {
        let mut rules: Vec<FieldRule> = Vec::new();
        for (name, spec) in entries {
            let name = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(schema_error("field name is empty", &name));
            }
            if rules.iter().any(|r| r.name == trimmed) {
                return Err(schema_error("duplicate field name", trimmed));
            }
            if spec.confidence_threshold > 100 {
                return Err(schema_error(
                    format!(
                        "confidence_threshold {} is outside 0..=100",
                        spec.confidence_threshold
                    ),
                    trimmed,
                ));
            }

            let mut labels: Vec<String> = Vec::with_capacity(spec.labels.len());
            for label in &spec.labels {
                let label = label.trim().to_lowercase();
                if !label.is_empty() && !labels.contains(&label) {
                    labels.push(label);
                }
            }
            if labels.is_empty() {
                return Err(schema_error("field has no usable labels", trimmed));
            }

            rules.push(FieldRule {
                name: trimmed.to_string(),
                labels,
                threshold: spec.confidence_threshold,
            });
        }

        if rules.is_empty() {
            return Err(ExtractError::initialization(
                "FieldMapping",
                Some(anyhow::anyhow!("field mapping is empty")),
            ));
        }
        Ok(Self { rules })
    }

    /// Parses and validates a mapping from a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(json).map_err(|e| {
            ExtractError::initialization(
                "FieldMapping",
                Some(anyhow::anyhow!("invalid field mapping JSON: {}", e)),
            )
        })
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Looks up a rule by canonical field name.
    pub fn get(&self, field: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == field)
    }

    /// Canonical field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn schema_error(reason: impl fmt::Display, field: &str) -> ExtractError {
    ExtractError::initialization("FieldMapping", Some(anyhow::anyhow!("{}", reason)))
        .with_element(field)
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = FieldMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field name to {labels, confidence_threshold}")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // Collected in document order; duplicates are caught by validation.
                let mut entries: Vec<(String, FieldSpec)> = Vec::new();
                while let Some((name, spec)) = access.next_entry::<String, FieldSpec>()? {
                    entries.push((name, spec));
                }
                FieldMapping::from_entries(entries).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

impl Serialize for FieldMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            let spec = FieldSpec {
                labels: rule.labels.clone(),
                confidence_threshold: rule.threshold,
            };
            map.serialize_entry(&rule.name, &spec)?;
        }
        map.end()
    }
}
