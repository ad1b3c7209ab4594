// src/services/extract.rs

//! Article extraction collaborators.
//!
//! Two interchangeable backends: a Diffbot-style article API that returns
//! plain text directly, and an Embedly-style extract API whose HTML content
//! is stripped to text here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::ExtractorConfig;

/// Extracted article payload. No partial objects: every field is required
/// except `authors`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleContent {
    pub text: String,
    pub authors: Option<String>,
    /// ISO-639-ish language code of the original text
    pub language: String,
    /// Name of the extraction service used
    pub extractor: String,
}

/// Fetches the readable text of an article behind a URL.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, full_url: &str) -> Result<ArticleContent>;
}

// --- Diffbot ---

#[derive(Debug, Deserialize)]
struct DiffbotResponse {
    #[serde(default)]
    objects: Vec<DiffbotObject>,
}

#[derive(Debug, Deserialize)]
struct DiffbotObject {
    #[serde(default)]
    text: String,
    author: Option<String>,
    #[serde(rename = "humanLanguage", default)]
    human_language: String,
}

/// Diffbot article API client.
pub struct DiffbotExtractor {
    client: Client,
    api_url: String,
    api_key: String,
}

impl DiffbotExtractor {
    pub fn new(client: Client, config: &ExtractorConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn content_from(url: &str, response: DiffbotResponse) -> Result<ArticleContent> {
        let [object] = <[DiffbotObject; 1]>::try_from(response.objects).map_err(
            |objects: Vec<DiffbotObject>| {
                AppError::extraction(
                    url,
                    format!("expected [1] object but [{}] found", objects.len()),
                )
            },
        )?;
        if object.text.is_empty() {
            return Err(AppError::extraction(url, "no text extracted"));
        }
        if object.human_language.is_empty() {
            return Err(AppError::extraction(url, "no language reported"));
        }
        Ok(ArticleContent {
            text: object.text,
            authors: object.author,
            language: object.human_language,
            extractor: "diffbot".to_string(),
        })
    }
}

#[async_trait]
impl ArticleExtractor for DiffbotExtractor {
    async fn extract(&self, full_url: &str) -> Result<ArticleContent> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("token", self.api_key.as_str()), ("url", full_url.trim())])
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(AppError::extraction(
                full_url,
                format!("invalid response [{}]", response.status()),
            ));
        }
        let parsed: DiffbotResponse = response
            .json()
            .await
            .map_err(|e| AppError::extraction(full_url, format!("bad response: {e}")))?;
        Self::content_from(full_url, parsed)
    }
}

// --- Embedly ---

#[derive(Debug, Deserialize)]
struct EmbedlyResponse {
    content: Option<String>,
    #[serde(default)]
    authors: Vec<EmbedlyAuthor>,
    #[serde(default)]
    language: String,
}

#[derive(Debug, Deserialize)]
struct EmbedlyAuthor {
    #[serde(default)]
    name: String,
}

/// Embedly extract API client.
pub struct EmbedlyExtractor {
    client: Client,
    api_url: String,
    api_key: String,
}

impl EmbedlyExtractor {
    pub fn new(client: Client, config: &ExtractorConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn content_from(url: &str, response: EmbedlyResponse) -> Result<ArticleContent> {
        let html = response
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::extraction(url, "no content extracted"))?;
        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(AppError::extraction(url, "content stripped to nothing"));
        }
        let language = language_code(&response.language)
            .ok_or_else(|| {
                AppError::extraction(url, format!("unknown language [{}]", response.language))
            })?
            .to_string();
        let authors: Vec<&str> = response
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        Ok(ArticleContent {
            text,
            authors: if authors.is_empty() {
                None
            } else {
                Some(authors.join(","))
            },
            language,
            extractor: "embedly".to_string(),
        })
    }
}

#[async_trait]
impl ArticleExtractor for EmbedlyExtractor {
    async fn extract(&self, full_url: &str) -> Result<ArticleContent> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("key", self.api_key.as_str()), ("url", full_url.trim())])
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(AppError::extraction(
                full_url,
                format!("invalid response [{}]", response.status()),
            ));
        }
        let parsed: EmbedlyResponse = response
            .json()
            .await
            .map_err(|e| AppError::extraction(full_url, format!("bad response: {e}")))?;
        Self::content_from(full_url, parsed)
    }
}

/// Strip extractor-returned HTML down to its text content.
fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Embedly reports language names, not codes.
fn language_code(name: &str) -> Option<&'static str> {
    match name {
        "English" => Some("en"),
        "Russian" => Some("ru"),
        "German" => Some("de"),
        "French" => Some("fr"),
        "Spanish" => Some("es"),
        "Italian" => Some("it"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diffbot_parses_single_object() {
        let response: DiffbotResponse = serde_json::from_value(serde_json::json!({
            "objects": [{
                "text": "Article body.",
                "author": "A. Writer",
                "humanLanguage": "ru"
            }]
        }))
        .unwrap();
        let content = DiffbotExtractor::content_from("https://x.com/a", response).unwrap();
        assert_eq!(content.text, "Article body.");
        assert_eq!(content.authors.as_deref(), Some("A. Writer"));
        assert_eq!(content.language, "ru");
        assert_eq!(content.extractor, "diffbot");
    }

    #[test]
    fn diffbot_rejects_wrong_object_count() {
        let response: DiffbotResponse =
            serde_json::from_value(serde_json::json!({ "objects": [] })).unwrap();
        let err = DiffbotExtractor::content_from("https://x.com/a", response).unwrap_err();
        assert_eq!(err.kind(), "ExtractionError");
    }

    #[test]
    fn diffbot_rejects_empty_text() {
        let response: DiffbotResponse = serde_json::from_value(serde_json::json!({
            "objects": [{ "text": "", "humanLanguage": "en" }]
        }))
        .unwrap();
        assert!(DiffbotExtractor::content_from("https://x.com/a", response).is_err());
    }

    #[test]
    fn embedly_strips_html_and_maps_language() {
        let response: EmbedlyResponse = serde_json::from_value(serde_json::json!({
            "content": "<div><p>First.</p><p>Second.</p></div>",
            "authors": [{ "name": "A" }, { "name": "B" }],
            "language": "English"
        }))
        .unwrap();
        let content = EmbedlyExtractor::content_from("https://x.com/a", response).unwrap();
        assert_eq!(content.text, "First.Second.");
        assert_eq!(content.authors.as_deref(), Some("A,B"));
        assert_eq!(content.language, "en");
        assert_eq!(content.extractor, "embedly");
    }

    #[test]
    fn embedly_rejects_missing_content_and_unknown_language() {
        let empty: EmbedlyResponse =
            serde_json::from_value(serde_json::json!({ "language": "English" })).unwrap();
        assert!(EmbedlyExtractor::content_from("https://x.com/a", empty).is_err());

        let unknown: EmbedlyResponse = serde_json::from_value(serde_json::json!({
            "content": "<p>text</p>",
            "language": "Klingon"
        }))
        .unwrap();
        assert!(EmbedlyExtractor::content_from("https://x.com/a", unknown).is_err());
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("<p> padded </p>"), "padded");
        assert_eq!(html_to_text("plain"), "plain");
    }
}
