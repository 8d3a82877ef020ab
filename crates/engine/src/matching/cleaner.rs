// ABOUTME: Memoized text cleaner normalizing non-breaking spaces and splitting "label: value" fragments.
// ABOUTME: Returns the trimmed value after the first colon, hyphen, or en-dash, else the trimmed text.

use std::cell::RefCell;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// First label/value separator: colon, hyphen, or en-dash.
static LABEL_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:\-–]").unwrap());

#[derive(Debug, Default)]
pub struct TextCleaner {
    cache: RefCell<HashMap<String, String>>,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cleans a `label: value` fragment down to its value.
    pub fn clean(&self, text: &str) -> String {
        if let Some(hit) = self.cache.borrow().get(text) {
            return hit.clone();
        }
        let cleaned = clean_uncached(text);
        self.cache
            .borrow_mut()
            .insert(text.to_string(), cleaned.clone());
        cleaned
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

fn clean_uncached(text: &str) -> String {
    let text = text.replace('\u{a0}', " ");
    match LABEL_SEPARATOR.splitn(&text, 2).nth(1) {
        Some(value) => value.trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_colon() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("Director: Christopher Nolan"), "Christopher Nolan");
    }

    #[test]
    fn splits_on_first_separator_only() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("Genre - Sci-Fi"), "Sci-Fi");
        assert_eq!(cleaner.clean("Released – 2010: Worldwide"), "2010: Worldwide");
    }

    #[test]
    fn text_without_separator_is_trimmed() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("  Inception  "), "Inception");
    }

    #[test]
    fn non_breaking_spaces_become_spaces() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("Year:\u{a0}2010\u{a0}"), "2010");
        assert_eq!(cleaner.clean("Christopher\u{a0}Nolan"), "Christopher Nolan");
    }

    #[test]
    fn empty_input_is_empty() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean(""), "");
        assert_eq!(cleaner.clean("Director:"), "");
    }

    #[test]
    fn results_are_memoized_by_exact_input() {
        let cleaner = TextCleaner::new();
        cleaner.clean("Cast: A, B");
        cleaner.clean("Cast: A, B");
        cleaner.clean("cast: A, B");
        assert_eq!(cleaner.cached_len(), 2);
    }
}
