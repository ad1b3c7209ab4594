// src/services/resolver.rs

//! Short-link resolution and domain classification.
//!
//! The shortening service answers a redirect-disabled GET with a 301/302
//! whose HTML body confirms the destination in a fixed
//! `<a href="...">moved here` pattern. That format is an external contract;
//! the parser stays a narrow substring scan on purpose.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};

const HREF_MARKER: &str = "<a href=\"";
const MOVED_MARKER: &str = "\">moved here";

/// Resolves an obfuscated short link to its canonical destination URL.
#[async_trait]
pub trait ShortLinkResolver: Send + Sync {
    /// Resolve one short link. Failure is fatal to that link only.
    async fn resolve(&self, short_url: &str) -> Result<String>;
}

/// Resolver issuing a single non-following redirect request.
pub struct HttpLinkResolver {
    client: Client,
}

impl HttpLinkResolver {
    /// The client must be built with redirects disabled
    /// (see [`crate::utils::http::create_no_redirect_client`]).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ShortLinkResolver for HttpLinkResolver {
    async fn resolve(&self, short_url: &str) -> Result<String> {
        let response = self.client.get(short_url).send().await?;
        let status = response.status();
        if status != StatusCode::MOVED_PERMANENTLY && status != StatusCode::FOUND {
            return Err(AppError::resolution(
                short_url,
                format!("link returned [{status}]"),
            ));
        }
        let html = response.text().await?;
        parse_redirect_body(&html)
            .map(str::to_string)
            .ok_or_else(|| AppError::resolution(short_url, "destination marker not found"))
    }
}

/// Extract the destination URL from the redirect-confirmation body.
pub fn parse_redirect_body(html: &str) -> Option<&str> {
    let start = html.find(HREF_MARKER)? + HREF_MARKER.len();
    let end = start + html[start..].find(MOVED_MARKER)?;
    if end > start { Some(&html[start..end]) } else { None }
}

/// Parse the authority component between `://` and the next `/`.
pub fn extract_domain(url: &str) -> Result<&str> {
    let start = url
        .find("://")
        .map(|idx| idx + "://".len())
        .ok_or_else(|| AppError::UrlParse(url.to_string()))?;
    let end = url[start..]
        .find('/')
        .ok_or_else(|| AppError::UrlParse(url.to_string()))?;
    if end == 0 {
        return Err(AppError::UrlParse(url.to_string()));
    }
    Ok(&url[start..start + end])
}

/// True iff the domain contains any filter entry as a literal substring.
///
/// Deliberately coarse: a filter entry also matches subdomains and unrelated
/// hosts sharing the substring. The list marks already well-known sources
/// that need no analysis.
pub fn classify(domain: &str, filter_domains: &[String]) -> bool {
    filter_domains.iter().any(|f| domain.contains(f.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_redirect_body() {
        let html = r#"<html><body><a href="https://example.com/article">moved here</a></body></html>"#;
        assert_eq!(
            parse_redirect_body(html),
            Some("https://example.com/article")
        );
    }

    #[test]
    fn rejects_body_without_markers() {
        assert_eq!(parse_redirect_body("<html>nothing</html>"), None);
        assert_eq!(parse_redirect_body(r#"<a href="https://x.com/">gone"#), None);
        // Markers in the wrong order yield nothing.
        assert_eq!(parse_redirect_body(r#"">moved here<a href=""#), None);
    }

    #[test]
    fn extracts_domain() {
        assert_eq!(
            extract_domain("https://example.com/a/b").unwrap(),
            "example.com"
        );
        assert_eq!(
            extract_domain("http://www.youtube.com/watch?v=1").unwrap(),
            "www.youtube.com"
        );
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(matches!(
            extract_domain("not-a-url"),
            Err(AppError::UrlParse(_))
        ));
        assert!(matches!(
            extract_domain("https://example.com"),
            Err(AppError::UrlParse(_))
        ));
        assert!(matches!(
            extract_domain("https:///path"),
            Err(AppError::UrlParse(_))
        ));
    }

    #[test]
    fn classifies_by_substring() {
        let filters = vec!["youtube.com".to_string(), "europa.eu".to_string()];
        assert!(classify("www.youtube.com", &filters));
        assert!(classify("eeas.europa.eu", &filters));
        assert!(!classify("example.com", &filters));
        assert!(classify("notyoutube.com.evil.org", &filters));
    }

    #[test]
    fn classify_with_empty_filter_list() {
        assert!(!classify("example.com", &[]));
    }
}
