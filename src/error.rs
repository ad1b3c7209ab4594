// src/error.rs

//! Unified error handling for the pipeline application.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Document store rejected or failed a request
    #[error("Store error: {0}")]
    Store(String),

    /// A record with the same short or full URL already exists.
    /// Expected under concurrent ingestion; callers log and continue.
    #[error("Duplicate key: {key}")]
    DuplicateKey { key: String },

    /// Short-link resolution failed for a single link
    #[error("Resolution error for {url}: {message}")]
    Resolution { url: String, message: String },

    /// URL could not be split into scheme/authority/path
    #[error("Malformed URL: {0}")]
    UrlParse(String),

    /// Article extraction collaborator failure
    #[error("Extraction error for {url}: {message}")]
    Extraction { url: String, message: String },

    /// Translation collaborator failure
    #[error("Translation error: {0}")]
    Translation(String),

    /// Translation input exceeded the provider's size quota
    #[error("Text size [{0}] exceeds translation quota")]
    TranslationQuota(usize),

    /// Annotation collaborator failure
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Document-to-text conversion failure
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record violated a pipeline precondition (programming invariant)
    #[error("Precondition violated: {0}")]
    Precondition(String),
}

impl AppError {
    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a duplicate-key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Create a resolution error for a single short link.
    pub fn resolution(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Resolution {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error with the offending URL.
    pub fn extraction(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable label persisted as `error_class` on errored records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "IoError",
            Self::Http(_) => "HttpError",
            Self::Json(_) => "JsonError",
            Self::Toml(_) => "TomlError",
            Self::Store(_) => "StoreError",
            Self::DuplicateKey { .. } => "DuplicateKey",
            Self::Resolution { .. } => "ResolutionError",
            Self::UrlParse(_) => "ParseError",
            Self::Extraction { .. } => "ExtractionError",
            Self::Translation(_) | Self::TranslationQuota(_) => "TranslationError",
            Self::Annotation(_) => "AnnotationError",
            Self::Conversion(_) => "ConversionError",
            Self::Config(_) => "ConfigError",
            Self::Validation(_) => "ValidationError",
            Self::Precondition(_) => "PreconditionError",
        }
    }
}
