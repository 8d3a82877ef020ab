// ABOUTME: The ExtractorEngine that runs every extractor over a document and merges their output.
// ABOUTME: Sub-extractor failures are logged and omitted so one bad component never empties the page.

use std::rc::Rc;

use crate::document::Document;
use crate::error::ExtractError;
use crate::extractors::compiled::get_or_compile;
use crate::extractors::links::LinkExtractor;
use crate::extractors::main_fields::MainFieldExtractor;
use crate::extractors::paragraphs::ParagraphExtractor;
use crate::extractors::tables::TableExtractor;
use crate::matching::cleaner::TextCleaner;
use crate::matching::header::HeaderMapper;
use crate::matching::matcher::FieldMatcher;
use crate::matching::schema::FieldMapping;
use crate::matching::similarity::Similarity;
use crate::options::{EngineBuilder, Options};
use crate::result::{ExtractionResult, Record};

/// Runs link, main-field, paragraph and table extraction over documents.
///
/// Field merging is first-writer-wins in priority order: main fields, then
/// paragraphs, then table rows. The engine owns the matching caches, so it is
/// `!Sync`; use one engine per worker.
pub struct ExtractorEngine {
    matcher: Rc<FieldMatcher>,
    links: LinkExtractor,
    main_fields: MainFieldExtractor,
    paragraphs: ParagraphExtractor,
    tables: TableExtractor,
    table_selector: String,
}

impl ExtractorEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Creates an engine for `mapping` with default options.
    pub fn new(mapping: FieldMapping) -> Result<Self, ExtractError> {
        EngineBuilder::new().build(mapping)
    }

    pub(crate) fn from_parts(
        mapping: FieldMapping,
        opts: Options,
        similarity: Option<Box<dyn Similarity>>,
    ) -> Self {
        let matcher = Rc::new(match similarity {
            Some(similarity) => FieldMatcher::with_similarity(mapping, similarity),
            None => FieldMatcher::new(mapping),
        });
        let cleaner = Rc::new(TextCleaner::new());

        let links = LinkExtractor::new(
            opts.link_selectors.as_slice(),
            opts.invalid_link_patterns.as_slice(),
        );
        let paragraphs = ParagraphExtractor::new(
            Rc::clone(&matcher),
            cleaner,
            opts.paragraph_selector,
            (opts.paragraph_min_chars, opts.paragraph_max_chars),
            opts.paragraph_threshold,
        );
        let tables = TableExtractor::new(HeaderMapper::new(Rc::clone(&matcher)));

        Self {
            matcher,
            links,
            main_fields: MainFieldExtractor::new(opts.main_fields),
            paragraphs,
            tables,
            table_selector: opts.table_selector,
        }
    }

    pub fn field_matcher(&self) -> &FieldMatcher {
        &self.matcher
    }

    pub fn header_mapper(&self) -> &HeaderMapper {
        self.tables.header_mapper()
    }

    /// Parses `html` as the document at `url` and extracts from it.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<ExtractionResult, ExtractError> {
        let doc = Document::parse(html, url)?;
        Ok(self.extract_all(&doc))
    }

    /// Extracts links, fields and table items from `doc`.
    pub fn extract_all(&self, doc: &Document) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        match self.links.extract(doc) {
            Ok(links) => result.links = links,
            Err(e) => tracing::warn!(url = %doc.url(), error = %e, "Link extraction failed"),
        }

        result.merge_fields(self.main_fields.extract(doc.html()));

        match self.paragraphs.extract(doc) {
            Ok(fields) => {
                result.merge_fields(fields);
            }
            Err(e) => tracing::warn!(url = %doc.url(), error = %e, "Paragraph extraction failed"),
        }

        result.items = self.table_items(doc);
        let from_tables = result
            .items
            .iter()
            .flat_map(|record| record.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect::<Vec<_>>();
        result.merge_fields(from_tables);

        tracing::info!(
            url = %doc.url(),
            links = result.links.len(),
            fields = result.fields.len(),
            items = result.items.len(),
            "Extracted document"
        );
        result
    }

    fn table_items(&self, doc: &Document) -> Vec<Record> {
        let Some(selector) = get_or_compile(&self.table_selector) else {
            let e = ExtractError::extraction(
                "TableExtractor",
                Some(anyhow::anyhow!("table selector does not compile")),
            )
            .with_element(&self.table_selector);
            tracing::warn!(url = %doc.url(), error = %e, "Table extraction failed");
            return Vec::new();
        };

        let mut items = Vec::new();
        for (index, table) in doc.html().select(&selector).enumerate() {
            match self.tables.extract(table) {
                Ok(rows) => items.extend(rows),
                Err(e) => {
                    tracing::warn!(url = %doc.url(), table = index, error = %e, "Skipping table")
                }
            }
        }
        items
    }
}

impl std::fmt::Debug for ExtractorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorEngine")
            .field("matcher", &self.matcher)
            .field("table_selector", &self.table_selector)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::loader::load_builtin_mapping;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://example.com/movies/inception";

    fn engine() -> ExtractorEngine {
        ExtractorEngine::new(load_builtin_mapping("movies").unwrap()).unwrap()
    }

    #[test]
    fn main_fields_take_priority_over_paragraphs() {
        let result = engine()
            .extract_html(
                "<html><body><h1 class='entry-title'>Inception</h1>
                 <p>Title: Something Else</p><p>Director: Christopher Nolan</p></body></html>",
                URL,
            )
            .unwrap();
        assert_eq!(result.field("title"), Some("Inception"));
        assert_eq!(result.field("director"), Some("Christopher Nolan"));
    }

    #[test]
    fn table_rows_fill_remaining_fields_only() {
        let result = engine()
            .extract_html(
                "<html><body><p>Director: Christopher Nolan</p>
                 <table><tr><th>Director</th><th>Year</th></tr>
                 <tr><td>Someone</td><td>2010</td></tr></table></body></html>",
                URL,
            )
            .unwrap();
        assert_eq!(result.field("director"), Some("Christopher Nolan"));
        assert_eq!(result.field("year"), Some("2010"));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0]["director"], "Someone");
    }

    #[test]
    fn broken_table_does_not_affect_other_results() {
        let result = engine()
            .extract_html(
                "<html><body><h1 class='title'>Dune</h1><table></table>
                 <table><tr><th>Genre</th></tr><tr><td>Sci-Fi</td></tr></table></body></html>",
                URL,
            )
            .unwrap();
        assert_eq!(result.field("title"), Some("Dune"));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.field("genre"), Some("Sci-Fi"));
    }

    #[test]
    fn invalid_paragraph_selector_only_drops_paragraphs() {
        let engine = ExtractorEngine::builder()
            .paragraph_selector("p:::")
            .build(load_builtin_mapping("movies").unwrap())
            .unwrap();
        let result = engine
            .extract_html(
                "<html><body><h1 class='title'>Dune</h1><p>Director: Denis Villeneuve</p></body></html>",
                URL,
            )
            .unwrap();
        assert_eq!(result.field("title"), Some("Dune"));
        assert_eq!(result.field("director"), None);
    }

    #[test]
    fn unavailable_document_is_extraction_error() {
        let err = engine().extract_html("   ", URL).unwrap_err();
        assert!(err.is_extraction());
        let err = engine().extract_html("<p>x</p>", "not a url").unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn empty_mapping_is_rejected() {
        let mapping = FieldMapping::from_json_str("{}");
        assert!(mapping.unwrap_err().is_initialization());
    }
}
