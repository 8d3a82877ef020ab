// ABOUTME: Maps a table's header texts to canonical fields using the shared FieldMatcher.
// ABOUTME: Memoizes per header text and per sorted header tuple for the mapper's lifetime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ExtractError;
use crate::matching::matcher::FieldMatcher;

/// Resolved association from header text to canonical field name.
///
/// Keys are lowercased and trimmed, so lookups ignore the casing of the
/// table that produced the mapping. Headers without a confident match are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    fields: HashMap<String, String>,
}

impl HeaderMapping {
    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.fields
            .get(&header_key(header))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, f)| (h.as_str(), f.as_str()))
    }
}

fn header_key(header: &str) -> String {
    header.trim().to_lowercase()
}

#[derive(Debug)]
pub struct HeaderMapper {
    matcher: Rc<FieldMatcher>,
    per_header: RefCell<HashMap<String, Option<String>>>,
    per_table: RefCell<HashMap<Vec<String>, Rc<HeaderMapping>>>,
}

impl HeaderMapper {
    pub fn new(matcher: Rc<FieldMatcher>) -> Self {
        Self {
            matcher,
            per_header: RefCell::new(HashMap::new()),
            per_table: RefCell::new(HashMap::new()),
        }
    }

    pub fn matcher(&self) -> &FieldMatcher {
        &self.matcher
    }

    /// Maps `headers` to canonical fields.
    ///
    /// Tables sharing the same set of header texts (in any order or casing)
    /// are served from the tuple cache without touching the matcher.
    pub fn map(&self, headers: &[String]) -> Result<Rc<HeaderMapping>, ExtractError> {
        let mut tuple: Vec<String> = headers
            .iter()
            .map(|h| header_key(h))
            .filter(|h| !h.is_empty())
            .collect();
        tuple.sort();

        if let Some(hit) = self.per_table.borrow().get(&tuple) {
            tracing::debug!(headers = ?tuple, "Header mapping served from cache");
            return Ok(Rc::clone(hit));
        }

        let mut mapping = HeaderMapping::default();
        for key in &tuple {
            if let Some(field) = self.field_for_header(key)? {
                mapping.fields.insert(key.clone(), field);
            }
        }

        let mapping = Rc::new(mapping);
        self.per_table
            .borrow_mut()
            .insert(tuple, Rc::clone(&mapping));
        Ok(mapping)
    }

    fn field_for_header(&self, key: &str) -> Result<Option<String>, ExtractError> {
        if let Some(hit) = self.per_header.borrow().get(key) {
            return Ok(hit.clone());
        }
        let result = self.matcher.match_text(key).map_err(|e| {
            ExtractError::table_processing("HeaderMapper", Some(e.into())).with_element(key)
        })?;
        self.per_header
            .borrow_mut()
            .insert(key.to_string(), result.field.clone());
        Ok(result.field)
    }

    /// Number of distinct header tuples memoized.
    pub fn cached_tables(&self) -> usize {
        self.per_table.borrow().len()
    }
}
