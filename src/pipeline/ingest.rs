// src/pipeline/ingest.rs

//! Newsletter ingestion pipeline.
//!
//! Discovers newsletter documents (by date range or explicit backfill list),
//! extracts candidate short links from their text, resolves each exactly
//! once, classifies the destination domain, and stores new records. The
//! store's create-if-absent is the sole synchronization point; every other
//! check is an optimization to avoid redundant network calls.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::{BackfillEntry, Config, IngestConfig, NewLink};
use crate::pipeline::pool;
use crate::services::{DocumentConverter, ShortLinkResolver, classify, extract_domain};
use crate::store::NewsStore;
use crate::utils::cache_file_name;

/// Counters for one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub documents_processed: usize,
    /// Dates with no published newsletter (expected, skipped silently)
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub links_found: usize,
    pub links_created: usize,
    /// Links short-circuited by an existence pre-check
    pub links_known: usize,
    /// Links that lost a create race to a concurrent worker
    pub links_duplicate: usize,
    pub links_failed: usize,
}

impl IngestOutcome {
    fn absorb(&mut self, other: IngestOutcome) {
        self.documents_processed += other.documents_processed;
        self.documents_skipped += other.documents_skipped;
        self.documents_failed += other.documents_failed;
        self.links_found += other.links_found;
        self.links_created += other.links_created;
        self.links_known += other.links_known;
        self.links_duplicate += other.links_duplicate;
        self.links_failed += other.links_failed;
    }
}

/// How one candidate link was settled.
enum MergeDisposition {
    Created,
    Known,
    Duplicate,
}

/// Newsletter ingestion pipeline with injected collaborators.
pub struct IngestPipeline {
    config: Arc<Config>,
    store: Arc<dyn NewsStore>,
    resolver: Arc<dyn ShortLinkResolver>,
    converter: Arc<dyn DocumentConverter>,
    /// Redirect-disabled client for newsletter downloads
    client: reqwest::Client,
}

impl IngestPipeline {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn NewsStore>,
        resolver: Arc<dyn ShortLinkResolver>,
        converter: Arc<dyn DocumentConverter>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
            converter,
            client,
        }
    }

    /// Ingest every date in `[start, end]` inclusive, one worker per date.
    pub async fn run_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<IngestOutcome> {
        if start > end {
            return Err(AppError::validation("start date is after end date"));
        }
        let mut dates = Vec::new();
        let mut date = start;
        while date <= end {
            dates.push(date);
            date = date
                .succ_opt()
                .ok_or_else(|| AppError::validation("date range overflows the calendar"))?;
        }

        log::info!("Ingesting newsletters for {} dates", dates.len());
        let pool_size = self.config.workers.pool_size;
        let outcomes = pool::run_bounded(dates, pool_size, |date| {
            let url = newsletter_url(&self.config.ingest, date);
            self.process_document_outcome(url, date)
        })
        .await;

        Ok(collect(outcomes))
    }

    /// Ingest an explicit backfill list, one worker per document.
    pub async fn run_backfill(&self, entries: &[BackfillEntry]) -> Result<IngestOutcome> {
        log::info!("Ingesting {} backfill documents", entries.len());
        let pool_size = self.config.workers.pool_size;
        let outcomes = pool::run_bounded(entries.to_vec(), pool_size, |entry| {
            self.process_document_outcome(entry.url, entry.date)
        })
        .await;

        Ok(collect(outcomes))
    }

    /// Per-document task body. All failures are absorbed here so one bad
    /// document never aborts the batch.
    async fn process_document_outcome(&self, url: String, date: NaiveDate) -> IngestOutcome {
        match self.process_document(&url, date).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => IngestOutcome {
                documents_skipped: 1,
                ..IngestOutcome::default()
            },
            Err(e) => {
                log::warn!("Failed to process document [{url}]: {e}");
                IngestOutcome {
                    documents_failed: 1,
                    ..IngestOutcome::default()
                }
            }
        }
    }

    /// Returns `Ok(None)` when no newsletter exists at the URL.
    async fn process_document(&self, url: &str, date: NaiveDate) -> Result<Option<IngestOutcome>> {
        let Some(path) = self.fetch_document(url).await? else {
            log::debug!("No newsletter found at [{url}]");
            return Ok(None);
        };
        let text = self.converter.to_text(&path).await?;
        let links = scan_short_links(&text, &self.config.ingest.short_link_prefix);
        log::info!(
            "Document [{}] contains [{}] candidate links",
            path.display(),
            links.len()
        );

        let mut outcome = IngestOutcome {
            documents_processed: 1,
            links_found: links.len(),
            ..IngestOutcome::default()
        };
        for short_url in &links {
            match self.merge_link(short_url, date).await {
                Ok(MergeDisposition::Created) => outcome.links_created += 1,
                Ok(MergeDisposition::Known) => outcome.links_known += 1,
                Ok(MergeDisposition::Duplicate) => outcome.links_duplicate += 1,
                Err(e) => {
                    log::warn!("Link [{short_url}] skipped: {e}");
                    outcome.links_failed += 1;
                }
            }
        }
        Ok(Some(outcome))
    }

    /// Download a newsletter into the local cache, or reuse a prior copy.
    /// A non-200 response means no newsletter was published for that URL.
    async fn fetch_document(&self, url: &str) -> Result<Option<PathBuf>> {
        let path = Path::new(&self.config.ingest.cache_dir).join(cache_file_name(url));
        if tokio::fs::try_exists(&path).await? {
            log::debug!(
                "Download skipped, file [{}] already downloaded",
                path.display()
            );
            return Ok(Some(path));
        }

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        log::info!("Downloaded [{url}] to [{}]", path.display());
        Ok(Some(path))
    }

    /// The merge step: settle one candidate link against the store.
    async fn merge_link(&self, short_url: &str, date: NaiveDate) -> Result<MergeDisposition> {
        if self.store.exists_short_url(short_url).await? {
            return Ok(MergeDisposition::Known);
        }

        let full_url = self.resolver.resolve(short_url).await?;
        if self.store.exists_full_url(&full_url).await? {
            return Ok(MergeDisposition::Known);
        }

        let domain = extract_domain(&full_url)?.to_string();
        let skip = classify(&domain, &self.config.ingest.filter_domains);
        let link = NewLink {
            short_url: short_url.to_string(),
            full_url,
            domain,
            skip,
            newsletter_date: date,
        };
        match self.store.create_link(&link).await {
            Ok(_) => Ok(MergeDisposition::Created),
            Err(AppError::DuplicateKey { key }) => {
                log::info!("Duplicated url [{key}] from [{short_url}], ignored.");
                Ok(MergeDisposition::Duplicate)
            }
            Err(e) => Err(e),
        }
    }
}

fn collect(outcomes: Vec<IngestOutcome>) -> IngestOutcome {
    let mut total = IngestOutcome::default();
    for outcome in outcomes {
        total.absorb(outcome);
    }
    total
}

/// Document URL for a given newsletter date, from the fixed naming template.
pub fn newsletter_url(config: &IngestConfig, date: NaiveDate) -> String {
    format!(
        "{}{}{}{}",
        config.newsletter_base_url,
        config.file_prefix,
        date.format("%d.%m.%Y"),
        config.file_suffix
    )
}

/// Whitespace tokens starting with the short-link prefix, deduplicated in
/// order of first appearance. No URL validation happens here; resolution is
/// the validator.
pub fn scan_short_links(text: &str, prefix: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .filter(|token| token.starts_with(prefix))
        .filter(|token| seen.insert(token.to_string()))
        .map(str::to_string)
        .collect()
}
