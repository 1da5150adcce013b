//! Book sources
//!
//! A source turns a natural-language query into raw catalog text. Parsing is
//! shared: every source gets [`BookSource::search_books`] for free.

mod groq_client;

pub use groq_client::{GroqClient, SYSTEM_PROMPT};

use crate::parser::{self, RawCatalog};
use async_trait::async_trait;
use livraria_common::{BookRecord, Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Query asking the source for every book by `author`
pub fn author_query(author: &str) -> String {
    format!("cadastre todos os livros do autor {}", author.trim())
}

/// Source of raw catalog text
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Fetch the raw payload for `query`
    ///
    /// Failures here are fatal for the whole ingestion call.
    async fn fetch_raw(&self, query: &str) -> Result<RawCatalog>;

    /// Fetch and parse; blank payloads become an empty batch
    async fn search_books(&self, query: &str) -> Result<Vec<BookRecord>> {
        let raw = self.fetch_raw(query).await?;

        if raw.is_blank() {
            warn!("Book source returned no data for query: {}", query);
            return Ok(Vec::new());
        }

        let records = parser::parse(&raw)?;
        info!("Parsed {} book record(s)", records.len());
        Ok(records)
    }
}

/// Reads a catalog payload (delimited or JSON) from a local file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BookSource for FileSource {
    async fn fetch_raw(&self, _query: &str) -> Result<RawCatalog> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::SourceUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        Ok(RawCatalog::detect(text))
    }
}
