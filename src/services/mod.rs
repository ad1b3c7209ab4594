// src/services/mod.rs

//! External collaborators behind trait seams.
//!
//! Each collaborator is injected into the pipelines as a trait object so
//! runs can swap providers via configuration and tests can use fakes:
//! - Short-link resolution (`ShortLinkResolver`)
//! - Article extraction (`ArticleExtractor`)
//! - Translation (`Translator`)
//! - Sentiment/entity annotation (`Annotator`)
//! - Document-to-text conversion (`DocumentConverter`)

mod annotate;
mod convert;
mod extract;
mod resolver;
mod translate;

pub use annotate::{Annotation, Annotator, GoogleAnnotator};
pub use convert::{DocumentConverter, PdftotextConverter, PlainTextConverter};
pub use extract::{ArticleContent, ArticleExtractor, DiffbotExtractor, EmbedlyExtractor};
pub use resolver::{
    HttpLinkResolver, ShortLinkResolver, classify, extract_domain, parse_redirect_body,
};
pub use translate::{GoogleTranslator, Translation, Translator, passthrough, translate_text};
