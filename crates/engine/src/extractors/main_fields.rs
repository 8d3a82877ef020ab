// ABOUTME: Extracts a small fixed set of high-value fields with prioritized structural selectors.
// ABOUTME: Tries one combined query per field, then each selector alone with a descendant-text fallback.

//! Main field extraction.
//!
//! Key behaviors:
//! - For each rule, all selectors are first queried together; the first
//!   match (in document order) with a non-empty direct value wins.
//! - Otherwise each selector is tried alone in priority order. A text
//!   selector whose match has no direct text falls back to all of the
//!   match's descendant text.
//! - Values are only trimmed; no label splitting is applied.
//! - A rule that yields nothing is simply absent from the output.

use scraper::{ElementRef, Html, Selector};

use crate::extractors::compiled::get_or_compile;
use crate::extractors::select::{inline_text, spec_direct_value, SelectorSpec};
use crate::options::MainFieldRule;
use crate::result::FieldMap;

pub struct MainFieldExtractor {
    rules: Vec<MainFieldRule>,
}

impl MainFieldExtractor {
    pub fn new(rules: Vec<MainFieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MainFieldRule] {
        &self.rules
    }

    pub fn extract(&self, html: &Html) -> FieldMap {
        let mut fields = FieldMap::new();
        for rule in &self.rules {
            if fields.contains_key(&rule.field) {
                continue;
            }
            if let Some(value) = extract_rule(html, rule) {
                fields.insert(rule.field.clone(), value);
            }
        }
        fields
    }
}

fn extract_rule(html: &Html, rule: &MainFieldRule) -> Option<String> {
    if rule.selectors.is_empty() {
        return None;
    }

    let compiled: Vec<(&SelectorSpec, Option<Selector>)> = rule
        .selectors
        .iter()
        .map(|spec| (spec, get_or_compile(spec.css())))
        .collect();
    let invalid = compiled.iter().filter(|(_, sel)| sel.is_none()).count();
    if invalid == compiled.len() {
        tracing::warn!(field = %rule.field, "No selector for field compiles; skipping field");
        return None;
    }
    if invalid > 0 {
        tracing::warn!(field = %rule.field, invalid, "Some selectors for field do not compile");
    }

    combined_value(html, rule, &compiled).or_else(|| individual_value(html, &compiled))
}

/// Queries every selector of the rule at once, in document order.
fn combined_value(
    html: &Html,
    rule: &MainFieldRule,
    compiled: &[(&SelectorSpec, Option<Selector>)],
) -> Option<String> {
    let css = rule
        .selectors
        .iter()
        .map(SelectorSpec::css)
        .collect::<Vec<_>>()
        .join(", ");
    let Some(combined) = get_or_compile(&css) else {
        tracing::debug!(field = %rule.field, "Combined selector unavailable; trying selectors one by one");
        return None;
    };

    html.select(&combined).find_map(|el| {
        let spec = owning_spec(el, compiled)?;
        spec_direct_value(el, spec)
    })
}

/// The highest-priority spec whose selector matches `el`.
fn owning_spec<'s>(
    el: ElementRef<'_>,
    compiled: &[(&'s SelectorSpec, Option<Selector>)],
) -> Option<&'s SelectorSpec> {
    compiled
        .iter()
        .find(|(_, sel)| sel.as_ref().is_some_and(|s| s.matches(&el)))
        .map(|(spec, _)| *spec)
}

fn individual_value(
    html: &Html,
    compiled: &[(&SelectorSpec, Option<Selector>)],
) -> Option<String> {
    for (spec, selector) in compiled {
        let Some(selector) = selector else {
            continue;
        };
        for el in html.select(selector) {
            if let Some(value) = spec_direct_value(el, spec) {
                return Some(value);
            }
            if spec.attr().is_none() {
                let nested = inline_text(el);
                if !nested.is_empty() {
                    return Some(nested);
                }
            }
        }
    }
    None
}
