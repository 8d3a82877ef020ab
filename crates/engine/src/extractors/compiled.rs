// ABOUTME: Process-wide cache of compiled CSS selectors shared by every extractor.
// ABOUTME: Invalid selectors are cached as misses so configuration errors are reported cheaply.

//! Compiled selector cache.
//!
//! Link, paragraph, table and main-field selectors come from `Options` and
//! are queried once per document. Each distinct selector string is parsed
//! once per process; later lookups clone the cached `Selector`.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

/// Selector string to its compiled form, `None` when it does not parse.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Returns the compiled selector for `css`, or `None` when it is invalid.
///
/// A poisoned lock is recovered rather than propagated, since the cache only
/// ever holds fully inserted entries.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if compiled.is_none() {
        tracing::debug!(selector = css, "Invalid CSS selector");
    }
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Compiles `selectors` into the cache and returns the ones that do not parse.
pub fn precompile_selectors<I, S>(selectors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut invalid = Vec::new();
    for css in selectors {
        let css = css.as_ref();
        if get_or_compile(css).is_none() {
            invalid.push(css.to_string());
        }
    }
    invalid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_selector_is_cached() {
        let selector = get_or_compile("div.container");
        assert!(selector.is_some());

        let selector2 = get_or_compile("div.container");
        assert!(selector2.is_some());
    }

    #[test]
    fn test_invalid_selector_returns_none() {
        let selector = get_or_compile("[[[invalid");
        assert!(selector.is_none());

        // Invalid selectors are also cached (as None)
        let selector2 = get_or_compile("[[[invalid");
        assert!(selector2.is_none());
    }

    #[test]
    fn test_precompile_selectors_reports_invalid() {
        let invalid = precompile_selectors(["h1", "p.intro", "a[href]", "td:::bad"]);
        assert_eq!(invalid, vec!["td:::bad".to_string()]);
        assert!(get_or_compile("a[href]").is_some());
    }
}
