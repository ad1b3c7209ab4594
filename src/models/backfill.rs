// src/models/backfill.rs

//! Explicit newsletter lists for historical backfill.
//!
//! Early newsletters were published under ad-hoc URLs that the dated naming
//! template does not cover; they are ingested from a TOML list instead.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One newsletter document with the date its links are attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackfillEntry {
    /// Full URL of the newsletter document
    pub url: String,

    /// Newsletter date recorded on every link found in the document
    pub date: NaiveDate,
}

/// A backfill list loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillList {
    #[serde(default)]
    pub entries: Vec<BackfillEntry>,
}

impl BackfillList {
    /// Load a backfill list from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let list: Self = toml::from_str(&content)?;
        list.validate()?;
        Ok(list)
    }

    /// Reject lists with unusable entries.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(AppError::validation("backfill list has no entries"));
        }
        for entry in &self.entries {
            if entry.url.trim().is_empty() {
                return Err(AppError::validation("backfill entry has an empty url"));
            }
        }
        Ok(())
    }
}
