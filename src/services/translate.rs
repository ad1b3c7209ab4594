// src/services/translate.rs

//! Translation collaborator and the oversized-input workaround.
//!
//! Providers reject inputs over a size quota. The documented workaround is
//! to split on line breaks and translate per line; [`translate_text`] does
//! that up front for inputs over the configured threshold and as a fallback
//! when the provider reports a quota error mid-flight.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::TranslatorConfig;

/// A completed translation, tagged with the service that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translator: String,
    pub text_en: String,
}

/// Translates text into English.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Service identifier persisted on the record.
    fn name(&self) -> &str;

    /// Translate one piece of text to English.
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Pass-through for text that is already English.
pub fn passthrough(text: &str) -> Translation {
    Translation {
        translator: "none".to_string(),
        text_en: text.to_string(),
    }
}

/// Translate `text`, chunking by line when it exceeds `chunk_threshold`
/// characters or when the provider reports a size quota error.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    chunk_threshold: usize,
) -> Result<Translation> {
    // Provider quotas are expressed in characters, not bytes.
    let text_en = if text.chars().count() > chunk_threshold {
        translate_by_line(translator, text).await?
    } else {
        match translator.translate(text).await {
            Ok(translated) => translated,
            Err(AppError::TranslationQuota(_)) => translate_by_line(translator, text).await?,
            Err(e) => return Err(e),
        }
    };
    Ok(Translation {
        translator: translator.name().to_string(),
        text_en,
    })
}

async fn translate_by_line(translator: &dyn Translator, text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    for line in text.split('\n') {
        result.push_str(&translator.translate(line).await?);
        result.push('\n');
    }
    Ok(result)
}

// --- Google ---

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Google translate v2 REST client.
pub struct GoogleTranslator {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, config: &TranslatorConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "q": text,
                "target": "en",
                "format": "text",
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST => {
                return Err(AppError::Translation("malformed request".to_string()));
            }
            StatusCode::FORBIDDEN => {
                return Err(AppError::Translation("daily limit exceeded".to_string()));
            }
            StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(AppError::TranslationQuota(text.len()));
            }
            status => {
                return Err(AppError::Translation(format!(
                    "invalid response status [{status}]"
                )));
            }
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Translation(format!("bad response: {e}")))?;
        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| AppError::Translation("empty translation list".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Uppercases input; rejects whole texts over `quota` bytes the way a
    /// provider would.
    struct FakeTranslator {
        quota: usize,
        calls: AtomicUsize,
    }

    impl FakeTranslator {
        fn new(quota: usize) -> Self {
            Self {
                quota,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        fn name(&self) -> &str {
            "fake"
        }

        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.len() > self.quota {
                return Err(AppError::TranslationQuota(text.len()));
            }
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn whole_text_when_under_threshold() {
        let translator = FakeTranslator::new(1000);
        let result = translate_text(&translator, "ab\ncd", 100).await.unwrap();
        assert_eq!(result.text_en, "AB\nCD");
        assert_eq!(result.translator, "fake");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn chunks_up_front_when_over_threshold() {
        let translator = FakeTranslator::new(1000);
        let result = translate_text(&translator, "ab\ncd", 3).await.unwrap();
        assert_eq!(result.text_en, "AB\nCD\n");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn threshold_counts_characters_not_bytes() {
        // Nine bytes but only five characters; a six-character threshold
        // must still take the whole-text path.
        let translator = FakeTranslator::new(1000);
        let result = translate_text(&translator, "аб\nвг", 6).await.unwrap();
        assert_eq!(result.text_en, "АБ\nВГ");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_lines_on_quota_error() {
        // Whole text exceeds the provider quota but each line fits.
        let translator = FakeTranslator::new(3);
        let result = translate_text(&translator, "ab\ncd", 100).await.unwrap();
        assert_eq!(result.text_en, "AB\nCD\n");
        // One failed whole-text attempt plus one call per line.
        assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_non_quota_errors() {
        struct Failing;

        #[async_trait]
        impl Translator for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            async fn translate(&self, _text: &str) -> Result<String> {
                Err(AppError::Translation("daily limit exceeded".to_string()))
            }
        }

        let err = translate_text(&Failing, "text", 100).await.unwrap_err();
        assert_eq!(err.kind(), "TranslationError");
    }

    #[test]
    fn passthrough_keeps_text_and_marks_translator_none() {
        let result = passthrough("already english");
        assert_eq!(result.translator, "none");
        assert_eq!(result.text_en, "already english");
    }

    #[test]
    fn parses_translate_response() {
        let parsed: TranslateResponse = serde_json::from_value(serde_json::json!({
            "data": { "translations": [{ "translatedText": "hello" }] }
        }))
        .unwrap();
        assert_eq!(parsed.data.translations[0].translated_text, "hello");
    }
}
