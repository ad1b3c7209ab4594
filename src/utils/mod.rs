// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

/// Cache file name for a downloaded document: the lower-cased basename of
/// the URL path.
pub fn cache_file_name(url: &str) -> String {
    match url.rfind('/') {
        Some(idx) => url[idx + 1..].to_lowercase(),
        None => url.to_lowercase(),
    }
}
