// src/services/annotate.rs

//! Sentiment and entity annotation collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{AnnotatorConfig, Entity};

/// Annotation result for one English text. Valid only with at least one
/// entity; an empty entity list is treated as a failed annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub sentiment_score: f64,
    pub sentiment_magnitude: f64,
    pub entities: Vec<Entity>,
}

/// Annotates English text with sentiment and named entities.
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, text_en: &str) -> Result<Annotation>;
}

// --- Google natural language ---

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(rename = "documentSentiment")]
    document_sentiment: Option<Sentiment>,
    #[serde(default)]
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct Sentiment {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    magnitude: f64,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    salience: f64,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Google natural-language annotateText client.
pub struct GoogleAnnotator {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GoogleAnnotator {
    pub fn new(client: Client, config: &AnnotatorConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn annotation_from(response: AnnotateResponse) -> Result<Annotation> {
        let sentiment = response
            .document_sentiment
            .ok_or_else(|| AppError::Annotation("missing document sentiment".to_string()))?;
        let entities: Vec<Entity> = response
            .entities
            .into_iter()
            .map(|mut raw| Entity {
                name: raw.name,
                entity_type: raw.entity_type,
                salience: raw.salience,
                wikipedia_url: raw.metadata.remove("wikipedia_url"),
            })
            .collect();
        if entities.is_empty() {
            return Err(AppError::Annotation("no entities found".to_string()));
        }
        Ok(Annotation {
            sentiment_score: sentiment.score,
            sentiment_magnitude: sentiment.magnitude,
            entities,
        })
    }
}

#[async_trait]
impl Annotator for GoogleAnnotator {
    async fn annotate(&self, text_en: &str) -> Result<Annotation> {
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "document": {
                    "type": "PLAIN_TEXT",
                    "content": text_en,
                },
                "features": {
                    "extractEntities": true,
                    "extractDocumentSentiment": true,
                },
                "encodingType": "UTF8",
            }))
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(AppError::Annotation(format!(
                "invalid response [{}]",
                response.status()
            )));
        }
        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Annotation(format!("bad response: {e}")))?;
        Self::annotation_from(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentiment_and_entities() {
        let response: AnnotateResponse = serde_json::from_value(serde_json::json!({
            "documentSentiment": { "score": -0.3, "magnitude": 2.1 },
            "entities": [{
                "name": "NATO",
                "type": "ORGANIZATION",
                "salience": 0.62,
                "metadata": { "wikipedia_url": "https://en.wikipedia.org/wiki/NATO" }
            }, {
                "name": "Kyiv",
                "type": "LOCATION",
                "salience": 0.11
            }]
        }))
        .unwrap();

        let annotation = GoogleAnnotator::annotation_from(response).unwrap();
        assert_eq!(annotation.sentiment_score, -0.3);
        assert_eq!(annotation.sentiment_magnitude, 2.1);
        assert_eq!(annotation.entities.len(), 2);
        assert_eq!(
            annotation.entities[0].wikipedia_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/NATO")
        );
        assert!(annotation.entities[1].wikipedia_url.is_none());
    }

    #[test]
    fn rejects_empty_entities() {
        let response: AnnotateResponse = serde_json::from_value(serde_json::json!({
            "documentSentiment": { "score": 0.0, "magnitude": 0.0 },
            "entities": []
        }))
        .unwrap();
        let err = GoogleAnnotator::annotation_from(response).unwrap_err();
        assert_eq!(err.kind(), "AnnotationError");
    }

    #[test]
    fn rejects_missing_sentiment() {
        let response: AnnotateResponse = serde_json::from_value(serde_json::json!({
            "entities": [{ "name": "X", "type": "OTHER", "salience": 1.0 }]
        }))
        .unwrap();
        assert!(GoogleAnnotator::annotation_from(response).is_err());
    }
}
