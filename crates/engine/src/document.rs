// ABOUTME: Document handle pairing a parsed HTML tree with its absolute source URL.
// ABOUTME: Rejects unusable input up front and decodes raw bytes using charset hints or detection.

use scraper::Html;
use url::Url;

use crate::error::ExtractError;

/// An already-fetched page, parsed and ready for querying.
pub struct Document {
    html: Html,
    url: Url,
}

impl Document {
    /// Parses `html` fetched from `url`.
    ///
    /// Fails with an `Extraction` error when the HTML is blank or the URL is
    /// not an absolute `http`/`https` URL.
    pub fn parse(html: &str, url: &str) -> Result<Self, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::extraction(
                "Document",
                Some(anyhow::anyhow!("empty HTML")),
            )
            .with_element(url));
        }
        let url = parse_base_url(url)?;
        Ok(Self {
            html: Html::parse_document(html),
            url,
        })
    }

    /// Decodes `bytes` and parses the result.
    ///
    /// The charset comes from a `Content-Type` hint when it names a known
    /// encoding, otherwise it is detected from the bytes.
    pub fn from_bytes(
        bytes: &[u8],
        content_type: Option<&str>,
        url: &str,
    ) -> Result<Self, ExtractError> {
        Self::parse(&decode_body(bytes, content_type), url)
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

fn parse_base_url(url: &str) -> Result<Url, ExtractError> {
    if url.trim().is_empty() {
        return Err(ExtractError::extraction(
            "Document",
            Some(anyhow::anyhow!("empty source URL")),
        ));
    }
    let mut parsed = Url::parse(url.trim()).map_err(|e| {
        ExtractError::extraction("Document", Some(anyhow::anyhow!("malformed URL: {}", e)))
            .with_element(url)
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ExtractError::extraction(
            "Document",
            Some(anyhow::anyhow!("source URL must be absolute http(s)")),
        )
        .with_element(url));
    }
    parsed.set_fragment(None);
    Ok(parsed)
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_html_and_http_url() {
        let doc = Document::parse("<html><body><p>Hi</p></body></html>", "https://example.com/movies#top")
            .unwrap();
        assert_eq!(doc.url().as_str(), "https://example.com/movies");
    }

    #[test]
    fn blank_html_is_extraction_error() {
        let err = Document::parse("  \n ", "https://example.com").unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn malformed_url_is_extraction_error() {
        let err = Document::parse("<p>x</p>", "not a url").unwrap_err();
        assert!(err.is_extraction());
        let err = Document::parse("<p>x</p>", "").unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn non_http_url_is_extraction_error() {
        let err = Document::parse("<p>x</p>", "file:///tmp/page.html").unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn extract_charset_handles_quotes() {
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn from_bytes_uses_charset_hint() {
        // "Café" in latin-1
        let bytes = b"<html><body><h1>Caf\xe9</h1></body></html>";
        let doc = Document::from_bytes(
            bytes,
            Some("text/html; charset=iso-8859-1"),
            "https://example.com/",
        )
        .unwrap();
        let selector = scraper::Selector::parse("h1").unwrap();
        let text: String = doc.html().select(&selector).next().unwrap().text().collect();
        assert_eq!(text, "Café");
    }

    #[test]
    fn from_bytes_detects_utf8_without_hint() {
        let html = "<html><body><h1>မြန်မာ</h1></body></html>";
        let doc = Document::from_bytes(html.as_bytes(), None, "https://example.com/").unwrap();
        let selector = scraper::Selector::parse("h1").unwrap();
        let text: String = doc.html().select(&selector).next().unwrap().text().collect();
        assert_eq!(text, "မြန်မာ");
    }
}
