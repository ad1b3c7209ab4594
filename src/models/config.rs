// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Document store connection settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Newsletter ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Worker pool settings
    #[serde(default)]
    pub workers: WorkerConfig,

    /// Article extraction collaborator
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Translation collaborator
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Annotation collaborator
    #[serde(default)]
    pub annotator: AnnotatorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.store.base_url.trim().is_empty() {
            return Err(AppError::validation("store.base_url is empty"));
        }
        if self.store.index.trim().is_empty() {
            return Err(AppError::validation("store.index is empty"));
        }
        if self.store.max_fetch_size == 0 {
            return Err(AppError::validation("store.max_fetch_size must be > 0"));
        }
        if self.ingest.short_link_prefix.trim().is_empty() {
            return Err(AppError::validation("ingest.short_link_prefix is empty"));
        }
        if self.workers.pool_size == 0 {
            return Err(AppError::validation("workers.pool_size must be > 0"));
        }
        if self.translator.chunk_threshold == 0 {
            return Err(AppError::validation(
                "translator.chunk_threshold must be > 0",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings shared by all outbound calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Document store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store endpoint
    #[serde(default = "defaults::store_base_url")]
    pub base_url: String,

    /// Index holding the news records
    #[serde(default = "defaults::store_index")]
    pub index: String,

    /// Maximum number of records returned by a backlog query
    #[serde(default = "defaults::max_fetch_size")]
    pub max_fetch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::store_base_url(),
            index: defaults::store_index(),
            max_fetch_size: defaults::max_fetch_size(),
        }
    }
}

/// Newsletter ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Base URL where dated newsletter documents are published
    #[serde(default = "defaults::newsletter_base_url")]
    pub newsletter_base_url: String,

    /// File name prefix of the dated naming template
    #[serde(default = "defaults::file_prefix")]
    pub file_prefix: String,

    /// File name suffix of the dated naming template
    #[serde(default = "defaults::file_suffix")]
    pub file_suffix: String,

    /// Tokens starting with this prefix are treated as resolvable short links
    #[serde(default = "defaults::short_link_prefix")]
    pub short_link_prefix: String,

    /// Directory for downloaded newsletter documents (download-once cache)
    #[serde(default = "defaults::cache_dir")]
    pub cache_dir: String,

    /// Domains excluded from analysis (substring match)
    #[serde(default = "defaults::filter_domains")]
    pub filter_domains: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            newsletter_base_url: defaults::newsletter_base_url(),
            file_prefix: defaults::file_prefix(),
            file_suffix: defaults::file_suffix(),
            short_link_prefix: defaults::short_link_prefix(),
            cache_dir: defaults::cache_dir(),
            filter_domains: defaults::filter_domains(),
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrently processed items per pipeline run
    #[serde(default = "defaults::pool_size")]
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: defaults::pool_size(),
        }
    }
}

/// Which article-extraction backend to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    #[default]
    Diffbot,
    Embedly,
}

/// Article extraction collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub kind: ExtractorKind,

    #[serde(default = "defaults::diffbot_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            api_url: defaults::diffbot_url(),
            api_key: String::new(),
        }
    }
}

/// Translation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "defaults::translate_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Inputs longer than this are translated line-by-line up front
    #[serde(default = "defaults::chunk_threshold")]
    pub chunk_threshold: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::translate_url(),
            api_key: String::new(),
            chunk_threshold: defaults::chunk_threshold(),
        }
    }
}

/// Annotation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    #[serde(default = "defaults::annotate_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::annotate_url(),
            api_key: String::new(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; newsmill/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Store defaults
    pub fn store_base_url() -> String {
        "http://127.0.0.1:9200".into()
    }
    pub fn store_index() -> String {
        "news".into()
    }
    pub fn max_fetch_size() -> usize {
        300
    }

    // Ingestion defaults
    pub fn newsletter_base_url() -> String {
        "https://eeas.europa.eu/sites/eeas/files/".into()
    }
    pub fn file_prefix() -> String {
        "disinformation_review_".into()
    }
    pub fn file_suffix() -> String {
        "_eng.pdf".into()
    }
    pub fn short_link_prefix() -> String {
        "http://bit.ly/".into()
    }
    pub fn cache_dir() -> String {
        "resources".into()
    }
    pub fn filter_domains() -> Vec<String> {
        [
            "youtube.com",
            "un.org",
            "europa.eu",
            "nato.int",
            "state.gov",
            "securitycouncilreport.org",
            "defense.gov",
            "stopfake.org",
            "theguardian.com",
            "amnesty.org",
            "justice.gov",
            "telegraph.co.uk",
            "euobserver.com",
            "martenscentre.eu",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Worker defaults
    pub fn pool_size() -> usize {
        4
    }

    // Collaborator defaults
    pub fn diffbot_url() -> String {
        "https://api.diffbot.com/v3/article".into()
    }
    pub fn translate_url() -> String {
        "https://translation.googleapis.com/language/translate/v2".into()
    }
    pub fn annotate_url() -> String {
        "https://language.googleapis.com/v1/documents:annotateText".into()
    }
    pub fn chunk_threshold() -> usize {
        10_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_pool_size() {
        let mut config = Config::default();
        config.workers.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_short_link_prefix() {
        let mut config = Config::default();
        config.ingest.short_link_prefix = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [workers]
            pool_size = 8

            [extractor]
            kind = "embedly"
            api_key = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.workers.pool_size, 8);
        assert_eq!(config.extractor.kind, ExtractorKind::Embedly);
        assert_eq!(config.store.max_fetch_size, 300);
        assert!(
            config
                .ingest
                .filter_domains
                .iter()
                .any(|d| d == "youtube.com")
        );
    }
}
