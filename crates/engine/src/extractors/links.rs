// ABOUTME: Outbound link discovery: resolves, defragments, validates, and deduplicates anchor hrefs.
// ABOUTME: Per-link failures are logged and skipped; an unusable selector set fails the whole call.

//! Link extraction.
//!
//! Anchors are gathered from a prioritized set of container selectors
//! unioned with a generic `a[href]` fallback. Each href is resolved
//! against the document URL, stripped of its fragment, and rejected when:
//! - it is blank or a pure fragment (`#...`),
//! - it resolves back to the document URL itself,
//! - its path ends in `/None` (a broken-template artifact),
//! - it does not resolve to an absolute `http`/`https` URL with a host,
//! - it matches a blocklisted pattern (case-insensitive).
//!
//! A pattern ending in `:` names a scheme and only matches as a prefix of
//! the trimmed raw href, so `tel:` rejects `tel:+15550100` but keeps
//! `http://hotel:8080/`. Any other pattern matches as a substring of the
//! raw href or of the resolved URL.

use std::collections::BTreeSet;

use aho_corasick::AhoCorasick;
use url::Url;

use crate::document::Document;
use crate::error::{preview, ExtractError};
use crate::extractors::compiled::get_or_compile;

/// Selector every link set is unioned with.
const GENERIC_ANCHOR_SELECTOR: &str = "a[href]";

/// Why a candidate href was not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRejection {
    Empty,
    Fragment,
    Unresolvable,
    BaseUrl,
    NoneSentinel,
    UnsupportedScheme,
    Blocklisted,
}

pub struct LinkExtractor {
    selector_css: String,
    /// Lowercased scheme patterns such as `mailto:`.
    scheme_prefixes: Vec<String>,
    blocklist: Option<AhoCorasick>,
}

impl LinkExtractor {
    /// Creates an extractor over `selectors` (plus `a[href]`) rejecting `invalid_patterns`.
    pub fn new<S: AsRef<str>>(selectors: &[S], invalid_patterns: &[S]) -> Self {
        let selector_css = selectors
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .chain([GENERIC_ANCHOR_SELECTOR])
            .collect::<Vec<_>>()
            .join(", ");

        let (schemes, patterns): (Vec<&str>, Vec<&str>) = invalid_patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .partition(|p| p.ends_with(':'));
        let scheme_prefixes = schemes.iter().map(|p| p.to_ascii_lowercase()).collect();
        let blocklist = if patterns.is_empty() {
            None
        } else {
            match AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(&patterns)
            {
                Ok(ac) => Some(ac),
                Err(e) => {
                    tracing::warn!(error = %e, "Link blocklist could not be built; ignoring it");
                    None
                }
            }
        };

        Self {
            selector_css,
            scheme_prefixes,
            blocklist,
        }
    }

    /// Extracts the deduplicated set of absolute links in `doc`.
    pub fn extract(&self, doc: &Document) -> Result<BTreeSet<String>, ExtractError> {
        let selector = get_or_compile(&self.selector_css).ok_or_else(|| {
            ExtractError::extraction(
                "LinkExtractor",
                Some(anyhow::anyhow!("link selectors do not compile")),
            )
            .with_element(&self.selector_css)
        })?;

        let base = doc.url();
        let mut links = BTreeSet::new();
        let mut rejected = 0usize;
        for anchor in doc.html().select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            match self.resolve(href, base) {
                Ok(url) => {
                    links.insert(url);
                }
                Err(reason) => {
                    rejected += 1;
                    log_rejection(href, reason);
                }
            }
        }

        tracing::info!(
            url = %base,
            links = links.len(),
            rejected,
            "Extracted valid links after filtering"
        );
        Ok(links)
    }

    /// Resolves and validates one href against `base`.
    pub fn resolve(&self, href: &str, base: &Url) -> Result<String, LinkRejection> {
        let raw = href.trim();
        if raw.is_empty() {
            return Err(LinkRejection::Empty);
        }
        if raw.starts_with('#') {
            return Err(LinkRejection::Fragment);
        }
        if self.has_blocked_scheme(raw) || self.is_blocklisted(raw) {
            return Err(LinkRejection::Blocklisted);
        }

        let mut resolved = base.join(raw).map_err(|_| LinkRejection::Unresolvable)?;
        resolved.set_fragment(None);

        if !matches!(resolved.scheme(), "http" | "https") {
            return Err(LinkRejection::UnsupportedScheme);
        }
        if resolved.host_str().map_or(true, str::is_empty) {
            return Err(LinkRejection::Unresolvable);
        }
        if &resolved == base {
            return Err(LinkRejection::BaseUrl);
        }
        if is_none_sentinel(&resolved) {
            return Err(LinkRejection::NoneSentinel);
        }
        if self.is_blocklisted(resolved.as_str()) {
            return Err(LinkRejection::Blocklisted);
        }
        Ok(resolved.into())
    }

    fn has_blocked_scheme(&self, raw: &str) -> bool {
        self.scheme_prefixes.iter().any(|prefix| {
            raw.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    fn is_blocklisted(&self, candidate: &str) -> bool {
        self.blocklist
            .as_ref()
            .is_some_and(|ac| ac.is_match(candidate))
    }
}

fn is_none_sentinel(url: &Url) -> bool {
    let path = url.path().trim_end_matches('/');
    path.len() >= 5 && path[path.len() - 5..].eq_ignore_ascii_case("/none")
}

fn log_rejection(href: &str, reason: LinkRejection) {
    match reason {
        LinkRejection::Unresolvable => {
            tracing::warn!(href = %preview(href), "Skipping link that does not resolve")
        }
        _ => tracing::debug!(href = %preview(href), reason = ?reason, "Skipping link"),
    }
}
