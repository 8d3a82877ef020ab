// ABOUTME: ExtractionResult holding the links, merged fields, and table records of one document.
// ABOUTME: Includes a plain-text formatter and first-writer-wins merging used by the engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Canonical field name to extracted value.
pub type FieldMap = BTreeMap<String, String>;

/// One partial record produced from a table row.
pub type Record = BTreeMap<String, String>;

/// Everything extracted from a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub links: BTreeSet<String>,
    pub fields: FieldMap,
    pub items: Vec<Record>,
}

impl ExtractionResult {
    /// Value of `field`, if any extractor populated it.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.fields.is_empty() && self.items.is_empty()
    }

    /// Adds every entry of `other` whose field is not populated yet.
    ///
    /// Returns how many fields were added.
    pub fn merge_fields<I>(&mut self, other: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut added = 0;
        for (field, value) in other {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.fields.entry(field) {
                slot.insert(value);
                added += 1;
            }
        }
        added
    }

    /// Format the result as human-readable plain text.
    pub fn format_text(&self) -> String {
        let mut parts = Vec::new();

        if !self.fields.is_empty() {
            let width = self.fields.keys().map(|k| k.len()).max().unwrap_or(0);
            let lines: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{:width$}  {}", k, v, width = width))
                .collect();
            parts.push(lines.join("\n"));
        }

        if !self.items.is_empty() {
            let lines: Vec<String> = self
                .items
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let cells: Vec<String> =
                        record.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    format!("[{}] {}", i + 1, cells.join(", "))
                })
                .collect();
            parts.push(format!("Items:\n{}", lines.join("\n")));
        }

        if !self.links.is_empty() {
            let lines: Vec<String> = self.links.iter().map(|l| format!("- {}", l)).collect();
            parts.push(format!("Links:\n{}", lines.join("\n")));
        }

        parts.join("\n\n")
    }
}
