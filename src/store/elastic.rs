// src/store/elastic.rs

//! Elasticsearch-backed store.
//!
//! Talks plain JSON-over-HTTP to a typeless (7+) Elasticsearch endpoint.
//! Records live in `{index}` keyed by a digest of the short URL; a companion
//! `{index}-urls` index keyed by a digest of the full URL holds one alias
//! document per resolved destination. Creating both with `_create` gives
//! at-most-one-writer-wins semantics on each URL column.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Enrichment, NewLink, NewsRecord, StoreConfig};
use crate::store::{NewsStore, record_id};

use async_trait::async_trait;

/// Store client for an Elasticsearch-style document store.
#[derive(Debug, Clone)]
pub struct ElasticStore {
    client: Client,
    base_url: String,
    index: String,
    urls_index: String,
}

/// Alias document recording that a full URL is already claimed.
#[derive(Debug, serde::Serialize, Deserialize)]
struct UrlAlias {
    full_url: String,
    short_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: NewsRecord,
}

impl ElasticStore {
    /// Create a store client for the configured endpoint.
    pub fn new(client: Client, config: &StoreConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            urls_index: format!("{}-urls", config.index),
            index: config.index.clone(),
        }
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{}", self.base_url, index)
    }

    fn doc_url(&self, index: &str, operation: &str, id: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, index, operation, id)
    }

    /// Map transport failures to a store error so startup diagnostics name
    /// the endpoint instead of a bare reqwest message.
    fn connection_error(&self, error: reqwest::Error) -> AppError {
        AppError::store(format!(
            "cannot reach store at [{}]: {}",
            self.base_url, error
        ))
    }

    async fn ensure_index(&self, index: &str, mapping: serde_json::Value) -> Result<()> {
        let url = self.index_url(index);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                log::info!("Index [{index}] not found, creating mapping.");
                let response = self
                    .client
                    .put(&url)
                    .json(&mapping)
                    .send()
                    .await
                    .map_err(|e| self.connection_error(e))?;
                ensure_ok(response, "create index").await?;
                Ok(())
            }
            status => Err(AppError::store(format!(
                "schema check for [{index}] returned [{status}]"
            ))),
        }
    }

    /// Fixed mapping for the news index.
    fn news_mapping() -> serde_json::Value {
        json!({
            "mappings": {
                "properties": {
                    "id": { "type": "keyword" },
                    "short_url": { "type": "keyword" },
                    "full_url": { "type": "keyword" },
                    "domain": { "type": "keyword" },
                    "skip": { "type": "boolean" },
                    "newsletter_date": { "type": "date", "format": "yyyy-MM-dd" },
                    "state": { "type": "keyword" },
                    "text_original": { "type": "text" },
                    "authors": { "type": "text" },
                    "text_en": { "type": "text" },
                    "translator": { "type": "keyword" },
                    "language": { "type": "keyword" },
                    "extractor": { "type": "keyword" },
                    "sentiment_score": { "type": "float" },
                    "sentiment_magnitude": { "type": "float" },
                    "entities": {
                        "properties": {
                            "name": { "type": "keyword" },
                            "type": { "type": "keyword" },
                            "salience": { "type": "float" },
                            "wikipedia_url": { "type": "keyword" }
                        }
                    },
                    "text_analysed": { "type": "boolean" },
                    "error_message": { "type": "text" },
                    "error_class": { "type": "keyword" }
                }
            }
        })
    }

    /// Fixed mapping for the full-URL alias index.
    fn urls_mapping() -> serde_json::Value {
        json!({
            "mappings": {
                "properties": {
                    "full_url": { "type": "keyword" },
                    "short_url": { "type": "keyword" }
                }
            }
        })
    }

    /// Backlog query: `skip != true AND text_analysed != true`, optionally
    /// also excluding records with an `error_class`.
    fn backlog_query(include_errors: bool, limit: usize) -> serde_json::Value {
        let mut must_not = vec![
            json!({ "term": { "skip": true } }),
            json!({ "term": { "text_analysed": true } }),
        ];
        if !include_errors {
            must_not.push(json!({ "exists": { "field": "error_class" } }));
        }
        json!({
            "size": limit,
            "query": {
                "constant_score": {
                    "filter": { "bool": { "must_not": must_not } }
                }
            }
        })
    }

    async fn exists_doc(&self, index: &str, id: &str) -> Result<bool> {
        let url = self.doc_url(index, "_doc", id);
        let response = self.client.head(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(AppError::store(format!(
                "existence check returned [{status}] for [{url}]"
            ))),
        }
    }

    /// Roll back a full-URL claim whose record write failed. Best-effort:
    /// the create error is what the caller needs to see, so a failed
    /// rollback is only logged.
    async fn release_full_url(&self, alias_id: &str) {
        let url = self.doc_url(&self.urls_index, "_doc", alias_id);
        let sent = self
            .client
            .delete(&url)
            .query(&[("refresh", "true")])
            .send()
            .await;
        match sent {
            Ok(response)
                if response.status() == StatusCode::OK
                    || response.status() == StatusCode::NOT_FOUND => {}
            Ok(response) => log::error!(
                "Failed to release full url claim [{alias_id}]: [{}]",
                response.status()
            ),
            Err(e) => log::error!("Failed to release full url claim [{alias_id}]: {e}"),
        }
    }

    /// Full-document replace of a mutated record.
    async fn replace_record(&self, record: &NewsRecord) -> Result<()> {
        if record.id.is_empty() {
            return Err(AppError::store("record has no id"));
        }
        let url = self.doc_url(&self.index, "_doc", &record.id);
        let response = self
            .client
            .put(&url)
            .query(&[("refresh", "true")])
            .json(record)
            .send()
            .await?;
        ensure_ok(response, "replace record").await?;
        Ok(())
    }
}

#[async_trait]
impl NewsStore for ElasticStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.ensure_index(&self.index, Self::news_mapping()).await?;
        self.ensure_index(&self.urls_index, Self::urls_mapping())
            .await
    }

    async fn create_link(&self, link: &NewLink) -> Result<String> {
        link.validate()?;
        let id = record_id(&link.short_url);
        let alias_id = record_id(&link.full_url);

        // Claim the full URL first so two short links resolving to the same
        // destination cannot both create records.
        let alias = UrlAlias {
            full_url: link.full_url.clone(),
            short_url: link.short_url.clone(),
        };
        let response = self
            .client
            .put(self.doc_url(&self.urls_index, "_create", &alias_id))
            .query(&[("refresh", "true")])
            .json(&alias)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(AppError::duplicate_key(&link.full_url));
        }
        ensure_ok(response, "claim full url").await?;

        // If the record write behind the claim fails for any reason, the
        // claim must not survive it, or the destination stays permanently
        // unreachable for future runs.
        let record = NewsRecord::new(id.clone(), link.clone());
        let created = match self
            .client
            .put(self.doc_url(&self.index, "_create", &id))
            .query(&[("refresh", "true")])
            .json(&record)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::CONFLICT => {
                Err(AppError::duplicate_key(&link.short_url))
            }
            Ok(response) => ensure_ok(response, "create record").await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = created {
            self.release_full_url(&alias_id).await;
            return Err(e);
        }
        Ok(id)
    }

    async fn exists_short_url(&self, short_url: &str) -> Result<bool> {
        self.exists_doc(&self.index, &record_id(short_url)).await
    }

    async fn exists_full_url(&self, full_url: &str) -> Result<bool> {
        self.exists_doc(&self.urls_index, &record_id(full_url))
            .await
    }

    async fn fetch_backlog(&self, include_errors: bool, limit: usize) -> Result<Vec<NewsRecord>> {
        let url = format!("{}/_search", self.index_url(&self.index));
        let response = self
            .client
            .post(&url)
            .json(&Self::backlog_query(include_errors, limit))
            .send()
            .await?;
        let response = ensure_ok(response, "backlog query").await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.hits.hits.into_iter().map(|h| h.source).collect())
    }

    async fn record_success(&self, record: &NewsRecord, enrichment: Enrichment) -> Result<()> {
        enrichment.validate()?;
        let mut updated = record.clone();
        updated.apply_enrichment(enrichment);
        self.replace_record(&updated).await
    }

    async fn record_error(&self, record: &NewsRecord, message: &str, class: &str) -> Result<()> {
        if message.is_empty() || class.is_empty() {
            return Err(AppError::validation("error message and class are required"));
        }
        let mut updated = record.clone();
        updated.apply_error(message, class);
        self.replace_record(&updated).await
    }
}

/// Accept only 200/201, surfacing the response body otherwise.
async fn ensure_ok(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK || status == StatusCode::CREATED {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::store(format!(
        "{context}: unexpected response [{status}]: {body}"
    )))
}
