// src/store/memory.rs

//! In-memory store backend.
//!
//! Enforces the same uniqueness and state-transition invariants as the
//! production backend. Used by tests and as an injectable fake for pipeline
//! development without a running store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Enrichment, NewLink, NewsRecord};
use crate::store::{NewsStore, record_id};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, NewsRecord>,
    by_short_url: HashMap<String, String>,
    by_full_url: HashMap<String, String>,
}

/// In-process store keyed by record id with secondary URL indexes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built record, bypassing link resolution. Intended for
    /// seeding test fixtures and imports.
    pub fn insert_record(&self, record: NewsRecord) -> Result<()> {
        let mut inner = self.lock();
        if inner.by_short_url.contains_key(&record.short_url) {
            return Err(AppError::duplicate_key(&record.short_url));
        }
        if inner.by_full_url.contains_key(&record.full_url) {
            return Err(AppError::duplicate_key(&record.full_url));
        }
        inner
            .by_short_url
            .insert(record.short_url.clone(), record.id.clone());
        inner
            .by_full_url
            .insert(record.full_url.clone(), record.id.clone());
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Look up a record by short URL.
    pub fn find_by_short_url(&self, short_url: &str) -> Option<NewsRecord> {
        let inner = self.lock();
        let id = inner.by_short_url.get(short_url)?;
        inner.records.get(id).cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; the data is
        // still consistent because every mutation is a single insert.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn create_link(&self, link: &NewLink) -> Result<String> {
        link.validate()?;
        let id = record_id(&link.short_url);
        let record = NewsRecord::new(id.clone(), link.clone());
        self.insert_record(record)?;
        Ok(id)
    }

    async fn exists_short_url(&self, short_url: &str) -> Result<bool> {
        Ok(self.lock().by_short_url.contains_key(short_url))
    }

    async fn exists_full_url(&self, full_url: &str) -> Result<bool> {
        Ok(self.lock().by_full_url.contains_key(full_url))
    }

    async fn fetch_backlog(&self, include_errors: bool, limit: usize) -> Result<Vec<NewsRecord>> {
        let inner = self.lock();
        Ok(inner
            .records
            .values()
            .filter(|r| r.in_backlog(include_errors))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_success(&self, record: &NewsRecord, enrichment: Enrichment) -> Result<()> {
        enrichment.validate()?;
        let mut inner = self.lock();
        let stored = inner
            .records
            .get_mut(&record.id)
            .ok_or_else(|| AppError::store(format!("unknown record id [{}]", record.id)))?;
        stored.apply_enrichment(enrichment);
        Ok(())
    }

    async fn record_error(&self, record: &NewsRecord, message: &str, class: &str) -> Result<()> {
        if message.is_empty() || class.is_empty() {
            return Err(AppError::validation("error message and class are required"));
        }
        let mut inner = self.lock();
        let stored = inner
            .records
            .get_mut(&record.id)
            .ok_or_else(|| AppError::store(format!("unknown record id [{}]", record.id)))?;
        stored.apply_error(message, class);
        Ok(())
    }
}
