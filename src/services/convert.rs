// src/services/convert.rs

//! Document-to-text conversion.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};

/// Converts a downloaded newsletter document into plain text.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn to_text(&self, path: &Path) -> Result<String>;
}

/// Converter shelling out to the `pdftotext` utility.
pub struct PdftotextConverter {
    binary: String,
}

impl PdftotextConverter {
    pub fn new() -> Self {
        Self {
            binary: "pdftotext".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PdftotextConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentConverter for PdftotextConverter {
    async fn to_text(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| AppError::Conversion(format!("cannot run [{}]: {e}", self.binary)))?;
        if !output.status.success() {
            return Err(AppError::Conversion(format!(
                "[{}] failed on [{}]: {}",
                self.binary,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Converter for documents that already are plain text.
#[derive(Debug, Default)]
pub struct PlainTextConverter;

#[async_trait]
impl DocumentConverter for PlainTextConverter {
    async fn to_text(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn plain_text_converter_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello http://bit.ly/abc world").unwrap();

        let text = PlainTextConverter.to_text(file.path()).await.unwrap();
        assert!(text.contains("http://bit.ly/abc"));
    }

    #[tokio::test]
    async fn pdftotext_reports_missing_binary() {
        let converter = PdftotextConverter::with_binary("definitely-not-installed-xyz");
        let err = converter
            .to_text(Path::new("/tmp/nope.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ConversionError");
    }
}
