// ABOUTME: Selector specs and DOM text helpers shared by the structural extractors.
// ABOUTME: Covers direct text, descendant text, trimmed attributes, and whitespace normalization.

//! Selector-based text and attribute helpers.
//!
//! Key behaviors:
//! - "Direct text" joins only an element's own text nodes, like `::text`.
//! - "Element text" joins every descendant text node with spaces, keeping
//!   cells and block children apart.
//! - "Inline text" concatenates descendant text as written, so inline markup
//!   such as `<a>` does not add spaces before punctuation.
//! - Both normalize whitespace (collapsed to single spaces, trimmed).
//! - Attribute values are trimmed; empty strings are treated as no match.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// Specifies how to read a value out of an element matched by a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// A CSS selector whose text is read, e.g. "h1.entry-title"
    Css(String),
    /// A CSS selector with attribute extraction, e.g. ["img", "src"]
    CssAttr(String, String),
}

impl SelectorSpec {
    pub fn css(&self) -> &str {
        match self {
            SelectorSpec::Css(css) => css,
            SelectorSpec::CssAttr(css, _) => css,
        }
    }

    pub fn attr(&self) -> Option<&str> {
        match self {
            SelectorSpec::Css(_) => None,
            SelectorSpec::CssAttr(_, attr) => Some(attr),
        }
    }
}

impl From<&str> for SelectorSpec {
    fn from(css: &str) -> Self {
        SelectorSpec::Css(css.to_string())
    }
}

impl From<(&str, &str)> for SelectorSpec {
    fn from((css, attr): (&str, &str)) -> Self {
        SelectorSpec::CssAttr(css.to_string(), attr.to_string())
    }
}

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text of `el`, whitespace-normalized.
pub fn element_text(el: ElementRef<'_>) -> String {
    let text: String = el.text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&text)
}

/// All descendant text of `el` concatenated as written, whitespace-normalized.
pub fn inline_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

/// Text of `el`'s own text-node children, whitespace-normalized.
pub fn direct_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&direct_text_nodes(el).join(" "))
}

/// Each non-blank own text node of `el`, trimmed, in document order.
pub fn direct_text_nodes(el: ElementRef<'_>) -> Vec<String> {
    el.children()
        .filter_map(text_of)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn text_of(node: NodeRef<'_, Node>) -> Option<&str> {
    match node.value() {
        Node::Text(text) => Some(&**text),
        _ => None,
    }
}

/// Trimmed value of `attr` on `el`, if present and non-empty.
pub fn attr_value(el: ElementRef<'_>, attr: &str) -> Option<String> {
    el.value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Value `spec` reads from `el`: the attribute for `CssAttr`, direct text for `Css`.
pub fn spec_direct_value(el: ElementRef<'_>, spec: &SelectorSpec) -> Option<String> {
    match spec.attr() {
        Some(attr) => attr_value(el, attr),
        None => Some(direct_text(el)).filter(|t| !t.is_empty()),
    }
}
