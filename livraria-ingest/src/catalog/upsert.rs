//! Book upsert: one transaction per book
//!
//! Author, genre and publisher are resolved (in that order) and the `livros`
//! row inserted inside a single transaction. Anything that fails rolls back
//! every write made for that book, including entities created earlier in
//! the same call.

use super::resolver::resolve_or_create;
use livraria_common::error::describe_db_error;
use livraria_common::{BookRecord, EntityKind, Error, Result};
use sqlx::{Connection, Sqlite, SqliteConnection, Transaction};
use tracing::{debug, info, warn};

/// Persist `record` and its related entities atomically, returning the new book id
///
/// The connection leaves this function in auto-commit mode whatever the
/// outcome: the transaction is always committed or rolled back here.
pub async fn upsert_book(conn: &mut SqliteConnection, record: &BookRecord) -> Result<i64> {
    let mut tx = conn.begin().await.map_err(|e| Error::Persistence {
        title: record.title.clone(),
        reason: format!("could not begin transaction: {}", describe_db_error(&e)),
    })?;

    match write_book(&mut tx, record).await {
        Ok(Some(book_id)) => {
            tx.commit().await.map_err(|e| Error::Persistence {
                title: record.title.clone(),
                reason: format!("commit failed: {}", describe_db_error(&e)),
            })?;
            info!("Book '{}' inserted with id {}", record.title, book_id);
            Ok(book_id)
        }
        Ok(None) => {
            rollback(tx, &record.title).await;
            Err(Error::Persistence {
                title: record.title.clone(),
                reason: "insert affected no rows".to_string(),
            })
        }
        Err(e) => {
            warn!(
                "Critical failure inserting book '{}', rolling back: {}",
                record.title, e
            );
            rollback(tx, &record.title).await;
            Err(e)
        }
    }
}

/// All writes for one book; `Ok(None)` when the book insert changed nothing
async fn write_book(tx: &mut Transaction<'_, Sqlite>, record: &BookRecord) -> Result<Option<i64>> {
    // Upstream data carries no nationality
    let author_id = resolve_or_create(&mut **tx, EntityKind::Author, &record.author, None).await?;
    let genre_id =
        resolve_or_create(&mut **tx, EntityKind::Genre, record.primary_genre(), None).await?;
    let publisher_id = resolve_or_create(
        &mut **tx,
        EntityKind::Publisher,
        &record.publisher,
        Some(&record.origin),
    )
    .await?;

    debug!(
        title = %record.title,
        author_id,
        genre_id,
        publisher_id,
        "Entities resolved, inserting book"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO livros (
            titulo, sinopse, ano_publicacao, numero_paginas, isbn, idioma_origem,
            autor_id, genero_id, editora_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.title)
    .bind(&record.synopsis)
    .bind(record.publication_year)
    .bind(record.page_count)
    .bind(&record.isbn)
    .bind(&record.origin)
    .bind(author_id)
    .bind(genre_id)
    .bind(publisher_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| Error::Persistence {
        title: record.title.clone(),
        reason: describe_db_error(&e),
    })?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(result.last_insert_rowid()))
}

/// Roll back, logging (not returning) a rollback failure so the original error survives
async fn rollback(tx: Transaction<'_, Sqlite>, title: &str) {
    match tx.rollback().await {
        Ok(()) => debug!("Transaction for '{}' rolled back", title),
        Err(e) => warn!(
            "Error rolling back transaction for '{}': {}",
            title,
            describe_db_error(&e)
        ),
    }
}
