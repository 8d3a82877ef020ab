// ABOUTME: Turns tabular markup into partial records using fuzzy-mapped header cells.
// ABOUTME: Rows are yielded lazily; malformed rows are skipped, missing headers fail the table.

//! Table extraction.
//!
//! Key behaviors:
//! - Only the table's own rows are considered (direct `tr` children or rows
//!   of its `thead`/`tbody`/`tfoot`); nested tables are left alone.
//! - The header is the first `thead` row. Without one, the first row is the
//!   header and the rest are data rows.
//! - Cell `i` is assigned to the field header `i` maps to. Extra cells and
//!   unmapped columns are ignored; the first non-empty cell for a field wins.
//! - Rows without cells are logged and skipped. Records with no assigned
//!   field are never yielded.

use scraper::ElementRef;

use crate::error::{preview, ExtractError};
use crate::extractors::select::element_text;
use crate::matching::header::HeaderMapper;
use crate::result::Record;

pub struct TableExtractor {
    header_mapper: HeaderMapper,
}

impl TableExtractor {
    pub fn new(header_mapper: HeaderMapper) -> Self {
        Self { header_mapper }
    }

    pub fn header_mapper(&self) -> &HeaderMapper {
        &self.header_mapper
    }

    /// Derives the header mapping of `table` and returns its data rows as records.
    ///
    /// Fails with a `TableProcessing` error when no header row can be derived.
    pub fn extract<'a>(&self, table: ElementRef<'a>) -> Result<TableRows<'a>, ExtractError> {
        let layout = TableLayout::of(table);
        let header_row = layout.header.ok_or_else(|| {
            ExtractError::table_processing(
                "TableExtractor",
                Some(anyhow::anyhow!("table has no rows to derive headers from")),
            )
        })?;

        let headers: Vec<String> = cells(header_row).map(element_text).collect();
        if headers.iter().all(String::is_empty) {
            return Err(ExtractError::table_processing(
                "TableExtractor",
                Some(anyhow::anyhow!("header row has no text")),
            ));
        }

        let mapping = self.header_mapper.map(&headers)?;
        tracing::debug!(
            headers = ?headers,
            mapped = mapping.len(),
            rows = layout.data.len(),
            "Derived table header mapping"
        );

        let columns = headers
            .iter()
            .map(|h| mapping.field_for(h).map(str::to_string))
            .collect();
        Ok(TableRows {
            rows: layout.data.into_iter(),
            columns,
        })
    }
}

/// Lazily converts data rows into records.
pub struct TableRows<'a> {
    rows: std::vec::IntoIter<ElementRef<'a>>,
    /// Field for each header position, if it mapped.
    columns: Vec<Option<String>>,
}

impl Iterator for TableRows<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for row in self.rows.by_ref() {
            if let Some(record) = record_for(&self.columns, row) {
                return Some(record);
            }
        }
        None
    }
}

fn record_for(columns: &[Option<String>], row: ElementRef<'_>) -> Option<Record> {
    let mut record = Record::new();
    let mut saw_cell = false;
    for (cell, column) in cells(row).zip(columns) {
        saw_cell = true;
        let Some(field) = column else {
            continue;
        };
        if record.contains_key(field) {
            continue;
        }
        let value = element_text(cell);
        if !value.is_empty() {
            record.insert(field.clone(), value);
        }
    }

    if !saw_cell {
        tracing::warn!(
            row = %preview(&element_text(row)),
            "Skipping table row without cells"
        );
    }
    Some(record).filter(|r| !r.is_empty())
}

struct TableLayout<'a> {
    header: Option<ElementRef<'a>>,
    data: Vec<ElementRef<'a>>,
}

impl<'a> TableLayout<'a> {
    fn of(table: ElementRef<'a>) -> Self {
        let mut head_rows = Vec::new();
        let mut body_rows = Vec::new();
        for child in table.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "tr" => body_rows.push(child),
                "thead" => head_rows.extend(rows_of(child)),
                "tbody" | "tfoot" => body_rows.extend(rows_of(child)),
                _ => {}
            }
        }

        let mut head_rows = head_rows.into_iter();
        match head_rows.next() {
            Some(header) => {
                // Extra header rows carry no data.
                Self {
                    header: Some(header),
                    data: body_rows,
                }
            }
            None => {
                let mut rows = body_rows.into_iter();
                Self {
                    header: rows.next(),
                    data: rows.collect(),
                }
            }
        }
    }
}

fn rows_of(section: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
}

fn cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
}
