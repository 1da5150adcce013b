//! Shared test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use livraria_common::{BookRecord, Result};
use livraria_ingest::parser::RawCatalog;
use livraria_ingest::{BookSource, Catalog};
use sqlx::{Connection, SqliteConnection};
use std::path::Path;
use tempfile::TempDir;

/// Create a connected catalog on a temporary database file
///
/// Returns (TempDir, Catalog) - TempDir must be kept alive for duration of test
pub async fn connected_catalog() -> (TempDir, Catalog) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let mut catalog = Catalog::new(temp_dir.path().join("livraria.db"));
    catalog.connect().await.expect("connect catalog");
    (temp_dir, catalog)
}

/// Open a second, independent connection to the same database file
pub async fn observer(db_path: &Path) -> SqliteConnection {
    let url = format!("sqlite://{}", db_path.display());
    SqliteConnection::connect(&url)
        .await
        .expect("open observer connection")
}

pub async fn count_rows(db_path: &Path, table: &str) -> i64 {
    let mut conn = observer(db_path).await;
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&mut conn)
        .await
        .expect("count rows")
}

/// Install a trigger on the catalog database, through an observer connection
pub async fn install_trigger(db_path: &Path, sql: &str) {
    let mut conn = observer(db_path).await;
    sqlx::query(sql).execute(&mut conn).await.expect("install trigger");
}

pub fn book(title: &str, author: &str, genre: &str, publisher: &str) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        synopsis: format!("Sinopse de {}", title),
        publication_year: 1950,
        publisher: publisher.to_string(),
        origin: "Brasil".to_string(),
        page_count: 300,
        isbn: "978-85-0000-000-0".to_string(),
    }
}

/// Book source returning a fixed payload
pub struct StaticSource(pub RawCatalog);

#[async_trait]
impl BookSource for StaticSource {
    async fn fetch_raw(&self, _query: &str) -> Result<RawCatalog> {
        Ok(self.0.clone())
    }
}
