//! livraria-ingest - Book catalog ingestion
//!
//! Turns free-text book queries into catalog rows:
//! raw source text → [`parser`] → `BookRecord`s → [`catalog`] (one
//! transaction per book, entities resolved by name) → `livros`.

pub mod catalog;
pub mod cli;
pub mod ingest;
pub mod logging;
pub mod menu;
pub mod parser;
pub mod report;
pub mod source;

pub use crate::catalog::{BookStore, Catalog};
pub use crate::ingest::{ingest, IngestSummary};
pub use crate::source::{BookSource, FileSource, GroqClient};
