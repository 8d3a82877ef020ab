// ABOUTME: Error types for the extraction engine including the ErrorKind enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Maximum number of characters of an offending element kept on an error.
const ELEMENT_PREVIEW_CHARS: usize = 60;

/// Categories of extraction failures that callers can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The field schema was rejected while constructing an engine.
    Initialization,
    /// The document, or a whole extraction phase over it, could not be read.
    Extraction,
    /// Field matching or text cleaning failed for reasons beyond one element.
    Processing,
    /// A table's header row could not be derived or its rows walked.
    TableProcessing,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Initialization => "initialization error",
            ErrorKind::Extraction => "extraction error",
            ErrorKind::Processing => "processing error",
            ErrorKind::TableProcessing => "table processing error",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by every fallible engine operation.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub kind: ErrorKind,
    pub op: String,
    /// A short preview of the element or fragment that triggered the error.
    pub element: Option<String>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fieldscope: {}: {}", self.op, self.kind)?;
        if let Some(ref element) = self.element {
            write!(f, " ({})", element)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(kind: ErrorKind, op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            kind,
            op: op.into(),
            element: None,
            source,
        }
    }

    /// Create an Initialization error.
    pub fn initialization(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorKind::Initialization, op, source)
    }

    /// Create an Extraction error.
    pub fn extraction(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorKind::Extraction, op, source)
    }

    /// Create a Processing error.
    pub fn processing(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorKind::Processing, op, source)
    }

    /// Create a TableProcessing error.
    pub fn table_processing(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorKind::TableProcessing, op, source)
    }

    /// Attach the offending element, truncated to a short preview.
    pub fn with_element(mut self, element: impl AsRef<str>) -> Self {
        self.element = Some(preview(element.as_ref()));
        self
    }

    /// Returns true if this is an Initialization error.
    pub fn is_initialization(&self) -> bool {
        self.kind == ErrorKind::Initialization
    }

    /// Returns true if this is an Extraction error.
    pub fn is_extraction(&self) -> bool {
        self.kind == ErrorKind::Extraction
    }

    /// Returns true if this is a Processing error.
    pub fn is_processing(&self) -> bool {
        self.kind == ErrorKind::Processing
    }

    /// Returns true if this is a TableProcessing error.
    pub fn is_table_processing(&self) -> bool {
        self.kind == ErrorKind::TableProcessing
    }
}

/// Truncates text to a char-safe preview for error messages and log lines.
pub(crate) fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(ELEMENT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
