// src/models/record.rs

//! The persisted news record and its enrichment state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Enrichment lifecycle of a record.
///
/// Stored alongside the legacy flags (`text_analysed`, `error_class`) so the
/// state is explicit rather than inferred from field presence. The only
/// forward transitions are pending→analysed, pending→errored,
/// errored→analysed and errored→errored; both are driven exclusively by
/// [`NewsRecord::apply_enrichment`] and [`NewsRecord::apply_error`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentState {
    #[default]
    Pending,
    Analysed,
    Errored,
}

/// A named entity extracted by the annotation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,

    /// Entity category (PERSON, ORGANIZATION, LOCATION, ...)
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Relevance of the entity to the whole text, 0.0..=1.0
    pub salience: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
}

/// Minimal fields required to create a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub short_url: String,
    pub full_url: String,
    pub domain: String,
    pub skip: bool,
    pub newsletter_date: NaiveDate,
}

impl NewLink {
    /// Reject links that would violate the store schema.
    pub fn validate(&self) -> Result<()> {
        if self.short_url.is_empty() {
            return Err(AppError::validation("short_url is empty"));
        }
        if self.full_url.is_empty() {
            return Err(AppError::validation("full_url is empty"));
        }
        if self.domain.is_empty() {
            return Err(AppError::validation("domain is empty"));
        }
        Ok(())
    }
}

/// Output of a successful enrichment run, applied to a record as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub text_original: String,
    pub authors: Option<String>,
    pub text_en: String,
    pub translator: String,
    pub language: String,
    pub extractor: String,
    pub sentiment_score: f64,
    pub sentiment_magnitude: f64,
    pub entities: Vec<Entity>,
}

impl Enrichment {
    /// Reject enrichment payloads that would corrupt the analysed state.
    pub fn validate(&self) -> Result<()> {
        if self.text_original.is_empty() {
            return Err(AppError::validation("text_original is empty"));
        }
        if self.text_en.is_empty() {
            return Err(AppError::validation("text_en is empty"));
        }
        if self.language.is_empty() {
            return Err(AppError::validation("language is empty"));
        }
        if self.entities.is_empty() {
            return Err(AppError::validation("missing entities"));
        }
        Ok(())
    }
}

/// A newsletter-sourced news article, the central persisted entity.
///
/// Enrichment and error fields are absent until the corresponding state is
/// reached, so serialized documents stay sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Opaque unique token assigned at creation
    pub id: String,

    /// Obfuscated redirect URL the link was found under (unique)
    pub short_url: String,

    /// Canonical destination URL (unique)
    pub full_url: String,

    /// Host component of `full_url`
    pub domain: String,

    /// True if the domain matched the known-legitimate filter list;
    /// such records never enter the enrichment backlog
    pub skip: bool,

    /// Date of the newsletter the link was sourced from
    pub newsletter_date: NaiveDate,

    #[serde(default)]
    pub state: EnrichmentState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_original: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_magnitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_analysed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
}

impl NewsRecord {
    /// Create a pending record from the minimal ingestion fields.
    pub fn new(id: impl Into<String>, link: NewLink) -> Self {
        Self {
            id: id.into(),
            short_url: link.short_url,
            full_url: link.full_url,
            domain: link.domain,
            skip: link.skip,
            newsletter_date: link.newsletter_date,
            state: EnrichmentState::Pending,
            text_original: None,
            authors: None,
            text_en: None,
            translator: None,
            language: None,
            extractor: None,
            sentiment_score: None,
            sentiment_magnitude: None,
            entities: None,
            text_analysed: None,
            error_message: None,
            error_class: None,
        }
    }

    /// Transition to the analysed state, replacing any prior error fields.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) {
        self.text_original = Some(enrichment.text_original);
        self.authors = enrichment.authors;
        self.text_en = Some(enrichment.text_en);
        self.translator = Some(enrichment.translator);
        self.language = Some(enrichment.language);
        self.extractor = Some(enrichment.extractor);
        self.sentiment_score = Some(enrichment.sentiment_score);
        self.sentiment_magnitude = Some(enrichment.sentiment_magnitude);
        self.entities = Some(enrichment.entities);
        self.text_analysed = Some(true);
        self.error_message = None;
        self.error_class = None;
        self.state = EnrichmentState::Analysed;
    }

    /// Transition to the errored state. Prior enrichment fields are left
    /// untouched; `text_analysed` is cleared so the record stays in the
    /// backlog for error-inclusive reruns.
    pub fn apply_error(&mut self, message: impl Into<String>, class: impl Into<String>) {
        self.error_message = Some(message.into());
        self.error_class = Some(class.into());
        self.text_analysed = None;
        self.state = EnrichmentState::Errored;
    }

    /// Whether the record belongs to the enrichment backlog.
    pub fn in_backlog(&self, include_errors: bool) -> bool {
        !self.skip
            && self.text_analysed != Some(true)
            && (include_errors || self.error_class.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> NewLink {
        NewLink {
            short_url: "http://bit.ly/abc".to_string(),
            full_url: "https://example.com/article".to_string(),
            domain: "example.com".to_string(),
            skip: false,
            newsletter_date: NaiveDate::from_ymd_opt(2017, 2, 9).unwrap(),
        }
    }

    fn sample_enrichment() -> Enrichment {
        Enrichment {
            text_original: "оригинал".to_string(),
            authors: Some("A. Writer".to_string()),
            text_en: "original".to_string(),
            translator: "google".to_string(),
            language: "ru".to_string(),
            extractor: "diffbot".to_string(),
            sentiment_score: -0.2,
            sentiment_magnitude: 1.4,
            entities: vec![Entity {
                name: "Example".to_string(),
                entity_type: "ORGANIZATION".to_string(),
                salience: 0.8,
                wikipedia_url: None,
            }],
        }
    }

    #[test]
    fn new_record_is_pending() {
        let record = NewsRecord::new("id1", sample_link());
        assert_eq!(record.state, EnrichmentState::Pending);
        assert!(record.text_analysed.is_none());
        assert!(record.in_backlog(false));
    }

    #[test]
    fn apply_enrichment_clears_errors() {
        let mut record = NewsRecord::new("id1", sample_link());
        record.apply_error("boom", "ExtractionError");
        assert_eq!(record.state, EnrichmentState::Errored);
        assert!(record.in_backlog(true));
        assert!(!record.in_backlog(false));

        record.apply_enrichment(sample_enrichment());
        assert_eq!(record.state, EnrichmentState::Analysed);
        assert_eq!(record.text_analysed, Some(true));
        assert!(record.error_message.is_none());
        assert!(record.error_class.is_none());
        assert!(!record.in_backlog(true));
    }

    #[test]
    fn apply_error_clears_analysed_flag_only() {
        let mut record = NewsRecord::new("id1", sample_link());
        record.apply_enrichment(sample_enrichment());
        record.apply_error("later failure", "AnnotationError");
        assert_eq!(record.state, EnrichmentState::Errored);
        assert!(record.text_analysed.is_none());
        // Prior enrichment data is preserved for triage.
        assert!(record.text_original.is_some());
    }

    #[test]
    fn skip_record_never_in_backlog() {
        let mut link = sample_link();
        link.skip = true;
        let record = NewsRecord::new("id1", link);
        assert!(!record.in_backlog(false));
        assert!(!record.in_backlog(true));
    }

    #[test]
    fn sparse_serialization_omits_absent_fields() {
        let record = NewsRecord::new("id1", sample_link());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("text_en").is_none());
        assert!(json.get("error_class").is_none());
        assert_eq!(json["newsletter_date"], "2017-02-09");
        assert_eq!(json["state"], "pending");
    }

    #[test]
    fn enrichment_requires_entities() {
        let mut enrichment = sample_enrichment();
        assert!(enrichment.validate().is_ok());
        enrichment.entities.clear();
        assert!(enrichment.validate().is_err());
    }
}
