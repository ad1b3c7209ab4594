// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `IngestPipeline`: discover newsletters and store resolved links
//! - `Enricher`: advance backlog records through text enrichment

pub mod enrich;
pub mod ingest;
pub mod pool;

pub use enrich::{EnrichOutcome, Enricher};
pub use ingest::{IngestOutcome, IngestPipeline, newsletter_url, scan_short_links};
