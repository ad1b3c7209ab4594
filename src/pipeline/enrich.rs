// src/pipeline/enrich.rs

//! Text-enrichment stage machine.
//!
//! Advances each backlog record through extraction → conditional translation
//! → annotation and persists the result. Every stage failure is caught at
//! the per-record boundary and recorded into the record's error fields; one
//! record's failure never aborts the batch.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, Enrichment, NewsRecord};
use crate::pipeline::pool;
use crate::services::{Annotator, ArticleExtractor, Translator, passthrough, translate_text};
use crate::store::NewsStore;

/// Counters for one enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichOutcome {
    pub processed: usize,
    pub analysed: usize,
    pub errored: usize,
    /// Records dropped for precondition violations or store write failures;
    /// nothing was recorded for these
    pub invalid: usize,
}

enum RecordOutcome {
    Analysed,
    Errored,
    Invalid,
}

/// Enrichment stage machine with injected collaborators.
pub struct Enricher {
    config: Arc<Config>,
    store: Arc<dyn NewsStore>,
    extractor: Arc<dyn ArticleExtractor>,
    translator: Arc<dyn Translator>,
    annotator: Arc<dyn Annotator>,
}

impl Enricher {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn NewsStore>,
        extractor: Arc<dyn ArticleExtractor>,
        translator: Arc<dyn Translator>,
        annotator: Arc<dyn Annotator>,
    ) -> Self {
        Self {
            config,
            store,
            extractor,
            translator,
            annotator,
        }
    }

    /// Fetch the backlog and enrich every record in it.
    pub async fn run(&self, include_errors: bool) -> Result<EnrichOutcome> {
        let backlog = self
            .store
            .fetch_backlog(include_errors, self.config.store.max_fetch_size)
            .await?;
        log::info!("Backlog contains [{}] records", backlog.len());

        let pool_size = self.config.workers.pool_size;
        let results =
            pool::run_bounded(backlog, pool_size, |record| self.process_record(record)).await;

        let mut outcome = EnrichOutcome {
            processed: results.len(),
            ..EnrichOutcome::default()
        };
        for result in results {
            match result {
                RecordOutcome::Analysed => outcome.analysed += 1,
                RecordOutcome::Errored => outcome.errored += 1,
                RecordOutcome::Invalid => outcome.invalid += 1,
            }
        }
        Ok(outcome)
    }

    /// Per-record task body; never returns an error to the pool.
    async fn process_record(&self, record: NewsRecord) -> RecordOutcome {
        if let Err(e) = check_preconditions(&record) {
            // Should not occur if the backlog query is correct.
            log::error!("Dropping record [{}]: {e}", record.short_url);
            return RecordOutcome::Invalid;
        }

        match self.enrich(&record).await {
            Ok(enrichment) => match self.store.record_success(&record, enrichment).await {
                Ok(()) => {
                    log::info!("Url [{}] processed.", record.short_url);
                    RecordOutcome::Analysed
                }
                Err(e) => {
                    log::error!("Failed to persist analysis for [{}]: {e}", record.short_url);
                    RecordOutcome::Invalid
                }
            },
            Err(e) => {
                log::warn!("Error while processing [{}]: [{e}].", record.short_url);
                match self.store.record_error(&record, &e.to_string(), e.kind()).await {
                    Ok(()) => RecordOutcome::Errored,
                    Err(store_err) => {
                        log::error!(
                            "Failed to persist error for [{}]: {store_err}",
                            record.short_url
                        );
                        RecordOutcome::Invalid
                    }
                }
            }
        }
    }

    /// Run the extract → translate → annotate stages for one record.
    async fn enrich(&self, record: &NewsRecord) -> Result<Enrichment> {
        let content = self.extractor.extract(&record.full_url).await?;

        let translation = if content.language != "en" {
            translate_text(
                self.translator.as_ref(),
                &content.text,
                self.config.translator.chunk_threshold,
            )
            .await?
        } else {
            passthrough(&content.text)
        };

        let annotation = self.annotator.annotate(&translation.text_en).await?;

        Ok(Enrichment {
            text_original: content.text,
            authors: content.authors,
            text_en: translation.text_en,
            translator: translation.translator,
            language: content.language,
            extractor: content.extractor,
            sentiment_score: annotation.sentiment_score,
            sentiment_magnitude: annotation.sentiment_magnitude,
            entities: annotation.entities,
        })
    }
}

/// Programming invariants guaranteed by a correct backlog query.
fn check_preconditions(record: &NewsRecord) -> Result<()> {
    if record.id.is_empty() {
        return Err(AppError::Precondition(format!(
            "missing id for url [{}]",
            record.short_url
        )));
    }
    if record.skip {
        return Err(AppError::Precondition(format!(
            "record [{}] should not have [skip] true",
            record.id
        )));
    }
    if record.text_analysed == Some(true) {
        return Err(AppError::Precondition(format!(
            "record [{}] should not have [text_analysed] true",
            record.id
        )));
    }
    Ok(())
}
