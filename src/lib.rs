// src/lib.rs

//! newsmill library
//!
//! Batch pipeline that resolves newsletter short links into canonical
//! article URLs, deduplicates them in a document store, and enriches each
//! stored article with extracted text, an English translation, and
//! sentiment/entity annotations.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod utils;
