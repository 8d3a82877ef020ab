// ABOUTME: Extracts labeled "Label: value" fields from paragraph-like elements via fuzzy matching.
// ABOUTME: Each field is assigned once, from the first qualifying fragment in document order.

//! Paragraph field extraction.
//!
//! Key behaviors:
//! - Each paragraph contributes its own text lines (split at child elements,
//!   e.g. `<br>`) followed by its full text when that differs.
//! - Fragments outside the configured character bounds are skipped.
//! - A fragment claims a field when the matcher's score is strictly above
//!   the paragraph threshold and the field is not yet assigned.
//! - The stored value is the cleaned fragment; a blank value leaves the
//!   field open for later fragments.

use std::rc::Rc;

use scraper::ElementRef;

use crate::document::Document;
use crate::error::{preview, ExtractError};
use crate::extractors::compiled::get_or_compile;
use crate::extractors::select::{direct_text_nodes, inline_text};
use crate::matching::cleaner::TextCleaner;
use crate::matching::matcher::FieldMatcher;
use crate::result::FieldMap;

pub struct ParagraphExtractor {
    matcher: Rc<FieldMatcher>,
    cleaner: Rc<TextCleaner>,
    selector: String,
    min_chars: usize,
    max_chars: usize,
    threshold: u8,
}

impl ParagraphExtractor {
    pub fn new(
        matcher: Rc<FieldMatcher>,
        cleaner: Rc<TextCleaner>,
        selector: impl Into<String>,
        bounds: (usize, usize),
        threshold: u8,
    ) -> Self {
        Self {
            matcher,
            cleaner,
            selector: selector.into(),
            min_chars: bounds.0,
            max_chars: bounds.1,
            threshold,
        }
    }

    pub fn extract(&self, doc: &Document) -> Result<FieldMap, ExtractError> {
        let selector = get_or_compile(&self.selector).ok_or_else(|| {
            ExtractError::extraction(
                "ParagraphExtractor",
                Some(anyhow::anyhow!("paragraph selector does not compile")),
            )
            .with_element(&self.selector)
        })?;

        let mut fields = FieldMap::new();
        let mut seen = 0usize;
        for paragraph in doc.html().select(&selector) {
            for fragment in fragments(paragraph) {
                if !self.within_bounds(&fragment) {
                    continue;
                }
                seen += 1;
                self.consider(&fragment, &mut fields)?;
            }
        }

        tracing::debug!(
            fragments = seen,
            fields = fields.len(),
            "Paragraph extraction finished"
        );
        Ok(fields)
    }

    fn within_bounds(&self, fragment: &str) -> bool {
        let len = fragment.chars().count();
        (self.min_chars..=self.max_chars).contains(&len)
    }

    fn consider(&self, fragment: &str, fields: &mut FieldMap) -> Result<(), ExtractError> {
        let result = self.matcher.match_text(fragment)?;
        let Some(field) = result.field else {
            return Ok(());
        };
        if result.score <= self.threshold || fields.contains_key(&field) {
            return Ok(());
        }

        let value = self.cleaner.clean(fragment);
        if value.is_empty() {
            tracing::debug!(field = %field, text = %preview(fragment), "Matched fragment has no value");
            return Ok(());
        }
        fields.insert(field, value);
        Ok(())
    }
}

/// Candidate fragments of one paragraph, trimmed and in document order.
fn fragments(paragraph: ElementRef<'_>) -> Vec<String> {
    let mut out = direct_text_nodes(paragraph);
    let full = inline_text(paragraph);
    if !full.is_empty() && !out.iter().any(|f| *f == full) {
        out.push(full);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::loader::load_builtin_mapping;
    use crate::matching::schema::{FieldMapping, FieldSpec};
    use crate::matching::similarity::Similarity;
    use pretty_assertions::assert_eq;

    /// Scores every pair alike, so only the length bounds decide.
    struct Constant(u8);

    impl Similarity for Constant {
        fn score(&self, _a: &str, _b: &str) -> u8 {
            self.0
        }
    }

    fn note_extractor() -> ParagraphExtractor {
        let mapping = FieldMapping::from_entries([(
            "note",
            FieldSpec {
                labels: vec!["note".into()],
                confidence_threshold: 70,
            },
        )])
        .unwrap();
        let matcher = Rc::new(FieldMatcher::with_similarity(mapping, Box::new(Constant(90))));
        ParagraphExtractor::new(matcher, Rc::new(TextCleaner::new()), "p", (5, 200), 70)
    }

    fn extractor() -> ParagraphExtractor {
        let matcher = Rc::new(FieldMatcher::new(load_builtin_mapping("movies").unwrap()));
        ParagraphExtractor::new(matcher, Rc::new(TextCleaner::new()), "p", (5, 200), 70)
    }

    fn doc(body: &str) -> Document {
        Document::parse(
            &format!("<html><body>{}</body></html>", body),
            "https://example.com/movies/1",
        )
        .unwrap()
    }

    #[test]
    fn labeled_paragraph_yields_cleaned_value() {
        let fields = extractor()
            .extract(&doc("<p>Director: Christopher Nolan</p>"))
            .unwrap();
        assert_eq!(fields.get("director").map(String::as_str), Some("Christopher Nolan"));
    }

    #[test]
    fn out_of_bounds_fragments_are_skipped() {
        let long = format!("Director: {}", "x".repeat(250));
        let fields = extractor()
            .extract(&doc(&format!("<p>Dir</p><p>{}</p>", long)))
            .unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn bounds_are_inclusive_at_both_ends() {
        let ex = note_extractor();
        assert!(!ex.within_bounds("a: b"));
        assert!(ex.within_bounds("a: bc"));

        let fields = ex.extract(&doc("<p>a: b</p>")).unwrap();
        assert!(fields.is_empty());
        let fields = ex.extract(&doc("<p>a: bc</p>")).unwrap();
        assert_eq!(fields["note"], "bc");

        // Counted in characters, not bytes.
        let at_max = format!("a: {}", "é".repeat(197));
        let over_max = format!("a: {}", "é".repeat(198));
        assert_eq!(at_max.chars().count(), 200);
        assert!(ex.within_bounds(&at_max));
        assert!(!ex.within_bounds(&over_max));

        let fields = ex.extract(&doc(&format!("<p>{}</p>", at_max))).unwrap();
        assert_eq!(fields["note"], "é".repeat(197));
        let fields = ex.extract(&doc(&format!("<p>{}</p>", over_max))).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn linked_values_keep_their_punctuation() {
        let fields = extractor()
            .extract(&doc(
                "<p>Director: <a href='/p/1'>Christopher Nolan</a>, <a href='/p/2'>Emma Thomas</a></p>",
            ))
            .unwrap();
        assert_eq!(fields["director"], "Christopher Nolan, Emma Thomas");
    }

    #[test]
    fn first_fragment_claims_the_field() {
        let fields = extractor()
            .extract(&doc(
                "<p>Director: Christopher Nolan</p><p>Director: Someone Else</p>",
            ))
            .unwrap();
        assert_eq!(fields["director"], "Christopher Nolan");
    }

    #[test]
    fn lines_split_at_breaks_are_matched_separately() {
        let fields = extractor()
            .extract(&doc("<p>Director: Christopher Nolan<br>Genre: Science Fiction</p>"))
            .unwrap();
        assert_eq!(fields["director"], "Christopher Nolan");
        assert_eq!(fields["genre"], "Science Fiction");
    }

    #[test]
    fn blank_value_leaves_field_open() {
        let fields = extractor()
            .extract(&doc("<p>Director:</p><p>Director: Greta Gerwig</p>"))
            .unwrap();
        assert_eq!(fields["director"], "Greta Gerwig");
    }

    #[test]
    fn unrelated_prose_matches_nothing() {
        let fields = extractor()
            .extract(&doc("<p>Welcome back! Check out our weekly picks.</p>"))
            .unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn invalid_selector_is_extraction_error() {
        let matcher = Rc::new(FieldMatcher::new(load_builtin_mapping("movies").unwrap()));
        let ex = ParagraphExtractor::new(matcher, Rc::new(TextCleaner::new()), "p:::", (5, 200), 70);
        let err = ex.extract(&doc("<p>Director: X</p>")).unwrap_err();
        assert!(err.is_extraction());
    }
}
