//! Database initialization
//!
//! Opens the single catalog connection and creates the schema if needed.
//! All statements are idempotent (`CREATE TABLE IF NOT EXISTS`), so this runs
//! on every connect.

use crate::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, SqliteConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (creating if missing) the SQLite database at `db_path` and bootstrap the schema
pub async fn open_catalog_connection(db_path: &Path) -> Result<SqliteConnection> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000))
        .connect()
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&mut conn).await?;

    Ok(conn)
}

/// Create all catalog tables plus the `usuarios` bootstrap table
pub async fn init_schema(conn: &mut SqliteConnection) -> Result<()> {
    create_usuarios_table(conn).await?;
    create_autores_table(conn).await?;
    create_generos_table(conn).await?;
    create_editoras_table(conn).await?;
    create_livros_table(conn).await?;
    Ok(())
}

async fn create_usuarios_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            data_cadastro TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_autores_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS autores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL UNIQUE,
            nacionalidade TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_generos_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_editoras_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS editoras (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL UNIQUE,
            pais_origem TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// No uniqueness on titulo/isbn: repeated ingestion may store the same book twice.
async fn create_livros_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS livros (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo TEXT NOT NULL,
            sinopse TEXT,
            ano_publicacao INTEGER,
            numero_paginas INTEGER,
            isbn TEXT,
            idioma_origem TEXT,
            autor_id INTEGER NOT NULL REFERENCES autores(id),
            genero_id INTEGER NOT NULL REFERENCES generos(id),
            editora_id INTEGER NOT NULL REFERENCES editoras(id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
