// src/models/mod.rs

//! Domain models for the pipeline application.

mod backfill;
mod config;
mod record;

// Re-export all public types
pub use backfill::{BackfillEntry, BackfillList};
pub use config::{
    AnnotatorConfig, Config, ExtractorConfig, ExtractorKind, HttpConfig, IngestConfig,
    StoreConfig, TranslatorConfig, WorkerConfig,
};
pub use record::{Enrichment, EnrichmentState, Entity, NewLink, NewsRecord};
