//! Catalog store
//!
//! Owns the single SQLite connection used by the ingest pipeline. The
//! connection is shared sequentially: one transaction at a time, no pool.

pub mod resolver;
pub mod upsert;

use crate::report::{self, TableSnapshot};
use async_trait::async_trait;
use livraria_common::db::init::open_catalog_connection;
use livraria_common::{BookRecord, Error, Result};
use sqlx::{Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use tracing::info;

/// Transactional relational store used by the ingest pipeline and reports
#[async_trait]
pub trait BookStore: Send {
    fn is_connected(&self) -> bool;

    /// Persist one book and its related entities atomically
    async fn upsert_book(&mut self, record: &BookRecord) -> Result<i64>;

    /// Read every row of `table` (read-only)
    async fn select_table(&mut self, table: &str) -> Result<TableSnapshot>;
}

/// SQLite-backed catalog
pub struct Catalog {
    db_path: PathBuf,
    conn: Option<SqliteConnection>,
}

impl Catalog {
    /// Create a disconnected catalog for the database at `db_path`
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open the connection and bootstrap the schema; no-op when already connected
    pub async fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            info!("Connection already active");
            return Ok(());
        }

        info!("Connecting to database {}", self.db_path.display());
        let conn = open_catalog_connection(&self.db_path).await?;
        self.conn = Some(conn);
        info!("Database connection established");
        Ok(())
    }

    /// Close the connection; no-op when already disconnected
    pub async fn disconnect(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().await?;
                info!("Database connection closed");
            }
            None => info!("No active connection to close"),
        }
        Ok(())
    }

    fn connection(&mut self, operation: &str) -> Result<&mut SqliteConnection> {
        self.conn.as_mut().ok_or_else(|| {
            Error::ConnectionState(format!(
                "cannot {}: database connection is not active",
                operation
            ))
        })
    }
}

#[async_trait]
impl BookStore for Catalog {
    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn upsert_book(&mut self, record: &BookRecord) -> Result<i64> {
        let conn = self.connection("insert book")?;
        upsert::upsert_book(conn, record).await
    }

    async fn select_table(&mut self, table: &str) -> Result<TableSnapshot> {
        let conn = self.connection("read table")?;
        report::select_table(conn, table).await
    }
}
