//! newsmill CLI
//!
//! Batch entry point: each subcommand processes its backlog and terminates.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use newsmill::{
    error::{AppError, Result},
    models::{BackfillList, Config, ExtractorKind},
    pipeline::{Enricher, IngestPipeline},
    services::{
        ArticleExtractor, DiffbotExtractor, EmbedlyExtractor, GoogleAnnotator, GoogleTranslator,
        HttpLinkResolver, PdftotextConverter,
    },
    store::{ElasticStore, NewsStore},
    utils::http,
};

/// newsmill - newsletter link resolution and article enrichment
#[derive(Parser, Debug)]
#[command(name = "newsmill", version, about = "Newsletter link enrichment pipeline")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "newsmill.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan dated newsletters and store newly resolved links
    Ingest {
        /// How many days back from today to scan
        #[arg(long, default_value_t = 10)]
        days: u32,
    },

    /// Ingest an explicit newsletter list (historical backfill)
    Backfill {
        /// TOML file with [[entries]] url/date pairs
        file: PathBuf,
    },

    /// Enrich backlog records with text, translation, and annotations
    Enrich {
        /// Also retry records that previously errored
        #[arg(long)]
        include_errors: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Connect to the store and verify the schema. Fatal if unreachable.
async fn connect_store(config: &Config) -> Result<Arc<dyn NewsStore>> {
    let client = http::create_client(&config.http)?;
    let store = ElasticStore::new(client, &config.store);
    store.ensure_schema().await?;
    Ok(Arc::new(store))
}

fn build_extractor(config: &Config) -> Result<Arc<dyn ArticleExtractor>> {
    let client = http::create_client(&config.http)?;
    Ok(match config.extractor.kind {
        ExtractorKind::Diffbot => Arc::new(DiffbotExtractor::new(client, &config.extractor)),
        ExtractorKind::Embedly => Arc::new(EmbedlyExtractor::new(client, &config.extractor)),
    })
}

fn build_ingest_pipeline(config: &Arc<Config>, store: Arc<dyn NewsStore>) -> Result<IngestPipeline> {
    let no_redirect = http::create_no_redirect_client(&config.http)?;
    let resolver = Arc::new(HttpLinkResolver::new(no_redirect.clone()));
    let converter = Arc::new(PdftotextConverter::new());
    Ok(IngestPipeline::new(
        Arc::clone(config),
        store,
        resolver,
        converter,
        no_redirect,
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(Config::load_or_default(&cli.config));
    config.validate()?;

    match cli.command {
        Command::Ingest { days } => {
            let store = connect_store(&config).await?;
            let pipeline = build_ingest_pipeline(&config, store)?;

            let end = Utc::now().date_naive();
            let start = end - Duration::days(i64::from(days));
            let outcome = pipeline.run_date_range(start, end).await?;

            log::info!(
                "Ingestion complete: {} documents processed, {} skipped, {} failed",
                outcome.documents_processed,
                outcome.documents_skipped,
                outcome.documents_failed
            );
            log::info!(
                "Links: {} found, {} created, {} known, {} duplicate, {} failed",
                outcome.links_found,
                outcome.links_created,
                outcome.links_known,
                outcome.links_duplicate,
                outcome.links_failed
            );
        }

        Command::Backfill { file } => {
            if !file.exists() {
                return Err(AppError::config(format!(
                    "Backfill file not found: {}",
                    file.display()
                )));
            }
            let list = BackfillList::load(&file)?;
            log::info!("Loaded {} backfill entries", list.entries.len());

            let store = connect_store(&config).await?;
            let pipeline = build_ingest_pipeline(&config, store)?;
            let outcome = pipeline.run_backfill(&list.entries).await?;

            log::info!(
                "Backfill complete: {} documents processed, {} links created",
                outcome.documents_processed,
                outcome.links_created
            );
        }

        Command::Enrich { include_errors } => {
            let store = connect_store(&config).await?;
            let client = http::create_client(&config.http)?;

            let enricher = Enricher::new(
                Arc::clone(&config),
                store,
                build_extractor(&config)?,
                Arc::new(GoogleTranslator::new(client.clone(), &config.translator)),
                Arc::new(GoogleAnnotator::new(client, &config.annotator)),
            );
            let outcome = enricher.run(include_errors).await?;

            log::info!(
                "Enrichment complete: {} processed, {} analysed, {} errored, {} invalid",
                outcome.processed,
                outcome.analysed,
                outcome.errored,
                outcome.invalid
            );
        }

        Command::Validate => {
            log::info!("Validating configuration from {}", cli.config.display());
            config.validate()?;
            log::info!("Config OK");
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
