//! Entity resolution (authors, genres, publishers)
//!
//! Lookup-or-create by exact name inside the caller's transaction. The insert
//! is `ON CONFLICT(nome) DO NOTHING` followed by a re-select, so a concurrent
//! writer creating the same name between our lookup and insert yields that
//! writer's row instead of a uniqueness failure.

use livraria_common::{EntityKind, Error, Result};
use sqlx::SqliteConnection;
use tracing::debug;

/// Return the id of the entity named `name`, inserting it if absent
///
/// `name` is trimmed before matching. `secondary` fills the nullable
/// attribute column (`nacionalidade` / `pais_origem`) on insert only; an
/// existing row is returned untouched. Genres have no secondary attribute.
pub async fn resolve_or_create(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
    secondary: Option<&str>,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Resolution {
            kind,
            name: name.to_string(),
            reason: "name is empty".to_string(),
        });
    }

    if let Some(id) = find_entity_id(conn, kind, name).await? {
        debug!(table = kind.table(), name, id, "Entity found");
        return Ok(id);
    }

    debug!(table = kind.table(), name, "Entity not found, inserting");

    let result = match kind.secondary_column() {
        Some(column) => {
            let sql = format!(
                "INSERT INTO {} (nome, {}) VALUES (?, ?) ON CONFLICT(nome) DO NOTHING",
                kind.table(),
                column
            );
            sqlx::query(&sql)
                .bind(name)
                .bind(secondary)
                .execute(&mut *conn)
                .await
        }
        None => {
            let sql = format!(
                "INSERT INTO {} (nome) VALUES (?) ON CONFLICT(nome) DO NOTHING",
                kind.table()
            );
            sqlx::query(&sql).bind(name).execute(&mut *conn).await
        }
    }
    .map_err(|e| Error::resolution(kind, name, &e))?;

    if result.rows_affected() > 0 {
        let id = result.last_insert_rowid();
        debug!(table = kind.table(), name, id, "Entity inserted");
        return Ok(id);
    }

    // Another writer created it after our lookup
    match find_entity_id(conn, kind, name).await? {
        Some(id) => {
            debug!(table = kind.table(), name, id, "Entity created concurrently, reusing");
            Ok(id)
        }
        None => Err(Error::Resolution {
            kind,
            name: name.to_string(),
            reason: "insert affected no rows and no existing row was found".to_string(),
        }),
    }
}

/// Exact-match lookup by stored name
pub async fn find_entity_id(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
) -> Result<Option<i64>> {
    let sql = format!("SELECT id FROM {} WHERE nome = ?", kind.table());
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::resolution(kind, name, &e))
}
