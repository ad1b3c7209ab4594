// src/store/mod.rs

//! Persistence abstractions for news records.
//!
//! The store is the only shared mutable resource in the system; its atomic
//! create-if-absent operation is what makes concurrent ingestion of the same
//! link resolve to exactly one record. All writes are either create-if-absent
//! or single-record replace.

pub mod elastic;
pub mod memory;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{Enrichment, NewLink, NewsRecord};

// Re-export for convenience
pub use elastic::ElasticStore;
pub use memory::MemoryStore;

/// Backend-agnostic contract for the news record store.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Verify the backing schema exists, creating it from the fixed
    /// definition if absent. An unreachable store is fatal to the process.
    async fn ensure_schema(&self) -> Result<()>;

    /// Atomically create a record iff neither its short nor its full URL is
    /// already present. Returns the new record id, or
    /// [`AppError::DuplicateKey`](crate::error::AppError::DuplicateKey) —
    /// benign under concurrent ingestion — if either collides.
    async fn create_link(&self, link: &NewLink) -> Result<String>;

    /// Point lookup used as a pre-check before network resolution. The
    /// create operation remains the authority on uniqueness.
    async fn exists_short_url(&self, short_url: &str) -> Result<bool>;

    /// Point lookup for an already-resolved destination URL.
    async fn exists_full_url(&self, full_url: &str) -> Result<bool>;

    /// Records eligible for enrichment: not skipped, not analysed, and
    /// (unless `include_errors`) without error fields. Order unspecified.
    async fn fetch_backlog(&self, include_errors: bool, limit: usize) -> Result<Vec<NewsRecord>>;

    /// Replace the record with enrichment fields populated and
    /// `text_analysed` set; prior error fields are cleared.
    async fn record_success(&self, record: &NewsRecord, enrichment: Enrichment) -> Result<()>;

    /// Replace the record with error fields set and `text_analysed` cleared;
    /// prior enrichment fields are left untouched.
    async fn record_error(&self, record: &NewsRecord, message: &str, class: &str) -> Result<()>;
}

/// Deterministic record id for a URL key.
///
/// Keying documents by a digest of the URL turns the store's
/// create-if-absent into an atomic uniqueness check on that URL.
pub fn record_id(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_deterministic() {
        assert_eq!(record_id("http://bit.ly/a"), record_id("http://bit.ly/a"));
        assert_ne!(record_id("http://bit.ly/a"), record_id("http://bit.ly/b"));
        assert_eq!(record_id("x").len(), 64);
    }
}
