//! Ingestion pipeline
//!
//! query → source → parser → one upsert transaction per record, in order.
//! A failed book is recorded and skipped; only source and connection
//! failures abort the call.

use crate::catalog::BookStore;
use crate::source::BookSource;
use livraria_common::{Error, Result};
use tracing::{info, warn};

/// Outcome of one ingestion call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records produced by the parser
    pub parsed: usize,
    /// (title, new book id) per committed book
    pub inserted: Vec<(String, i64)>,
    /// (title, error message) per rolled-back book
    pub failed: Vec<(String, String)>,
}

impl IngestSummary {
    pub fn is_empty(&self) -> bool {
        self.parsed == 0
    }
}

/// Fetch books for `query` from `source` and persist each into `store`
pub async fn ingest(
    source: &dyn BookSource,
    store: &mut dyn BookStore,
    query: &str,
) -> Result<IngestSummary> {
    if !store.is_connected() {
        return Err(Error::ConnectionState(
            "cannot ingest books: database connection is not active".to_string(),
        ));
    }

    info!("Requesting books: {}", query);
    let records = source.search_books(query).await?;

    let mut summary = IngestSummary {
        parsed: records.len(),
        ..Default::default()
    };

    if records.is_empty() {
        info!("No books were processed");
        return Ok(summary);
    }

    for record in &records {
        match store.upsert_book(record).await {
            Ok(book_id) => summary.inserted.push((record.title.clone(), book_id)),
            Err(e) => {
                warn!("Book '{}' was not saved: {}", record.title, e);
                summary.failed.push((record.title.clone(), e.to_string()));
            }
        }
    }

    info!(
        parsed = summary.parsed,
        inserted = summary.inserted.len(),
        failed = summary.failed.len(),
        "Ingestion finished"
    );

    Ok(summary)
}
