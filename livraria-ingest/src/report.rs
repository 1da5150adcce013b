//! Table contents report
//!
//! Read-only `SELECT *` over a catalog table, rendered as an aligned text
//! table for the operator. An empty table is reported, not treated as an error.

use livraria_common::{Error, Result};
use sqlx::{Column, Row, SqliteConnection, ValueRef};

const NULL_CELL: &str = "NULL";

/// Column names plus every row, each cell already formatted as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub table: String,
    pub columns: Vec<String>,
    /// `None` for SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fetch all rows of `table`
pub async fn select_table(conn: &mut SqliteConnection, table: &str) -> Result<TableSnapshot> {
    // Validate table name (prevent SQL injection)
    if !is_valid_table_name(table) {
        return Err(Error::InvalidTableName(table.to_string()));
    }

    let rows = sqlx::query(&format!("SELECT * FROM {}", table))
        .fetch_all(&mut *conn)
        .await?;

    let columns = if let Some(first_row) = rows.first() {
        first_row
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    } else {
        // Empty table - get columns from schema
        get_table_columns(conn, table).await?
    };

    let cells = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| cell_text(row, i)).collect())
        .collect();

    Ok(TableSnapshot {
        table: table.to_string(),
        columns,
        rows: cells,
    })
}

fn cell_text(row: &sqlx::sqlite::SqliteRow, i: usize) -> Option<String> {
    let raw = row.try_get_raw(i).ok()?;
    if raw.is_null() {
        return None;
    }
    // Try common types
    row.try_get::<String, _>(i)
        .ok()
        .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| v.to_string()))
        .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| v.to_string()))
}

/// Only allow alphanumeric and underscore
fn is_valid_table_name(name: &str) -> bool {
    name.chars().all(|c| c.is_alphanumeric() || c == '_') && !name.is_empty() && name.len() < 100
}

async fn get_table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(&mut *conn)
        .await?;

    if rows.is_empty() {
        return Err(Error::InvalidTableName(table.to_string()));
    }

    // PRAGMA table_info returns: (cid, name, type, notnull, dflt_value, pk)
    Ok(rows.iter().map(|row| row.get::<String, _>(1)).collect())
}

/// Render a snapshot as an aligned text table
///
/// Each column is as wide as the longest of its header and its values.
pub fn render(snapshot: &TableSnapshot) -> String {
    if snapshot.is_empty() {
        return format!("No rows found in table '{}'.\n", snapshot.table);
    }

    let widths: Vec<usize> = snapshot
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            snapshot
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.as_deref().unwrap_or(NULL_CELL).chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut out = String::new();
    out.push_str(&format!("--- Table: {} ---\n", snapshot.table));
    out.push_str(&format_line(snapshot.columns.iter().map(String::as_str), &widths));
    out.push_str(&separator);
    out.push('\n');
    for row in &snapshot.rows {
        let cells = row.iter().map(|cell| cell.as_deref().unwrap_or(NULL_CELL));
        out.push_str(&format_line(cells, &widths));
    }
    out.push_str(&format!("({} rows)\n", snapshot.rows.len()));
    out
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livraria_common::db::init::init_schema;
    use sqlx::Connection;

    async fn memory_catalog() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        init_schema(&mut conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_empty_table_reports_no_rows() {
        let mut conn = memory_catalog().await;

        let snapshot = select_table(&mut conn, "editoras").await.unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.columns, vec!["id", "nome", "pais_origem"]);
        assert_eq!(render(&snapshot), "No rows found in table 'editoras'.\n");
    }

    #[tokio::test]
    async fn test_rows_and_nulls() {
        let mut conn = memory_catalog().await;
        sqlx::query("INSERT INTO autores (nome, nacionalidade) VALUES ('Jorge Amado', NULL), ('Eça de Queirós', 'Portugal')")
            .execute(&mut conn)
            .await
            .unwrap();

        let snapshot = select_table(&mut conn, "autores").await.unwrap();

        assert_eq!(snapshot.columns, vec!["id", "nome", "nacionalidade"]);
        assert_eq!(
            snapshot.rows,
            vec![
                vec![Some("1".to_string()), Some("Jorge Amado".to_string()), None],
                vec![
                    Some("2".to_string()),
                    Some("Eça de Queirós".to_string()),
                    Some("Portugal".to_string())
                ],
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_tables_rejected() {
        let mut conn = memory_catalog().await;

        let injected = select_table(&mut conn, "livros; DROP TABLE livros").await;
        assert!(matches!(injected, Err(Error::InvalidTableName(_))));

        let unknown = select_table(&mut conn, "clientes").await;
        assert!(unknown.is_err());

        // Nothing was dropped
        assert!(select_table(&mut conn, "livros").await.is_ok());
    }

    #[test]
    fn test_render_aligns_columns() {
        let snapshot = TableSnapshot {
            table: "generos".to_string(),
            columns: vec!["id".to_string(), "nome".to_string()],
            rows: vec![
                vec![Some("1".to_string()), Some("Romance".to_string())],
                vec![Some("12".to_string()), Some("Ficção científica".to_string())],
            ],
        };

        let rendered = render(&snapshot);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "--- Table: generos ---");
        assert_eq!(lines[1], " id | nome");
        assert_eq!(lines[2], "----+-------------------");
        assert_eq!(lines[3], " 1  | Romance");
        assert_eq!(lines[4], " 12 | Ficção científica");
        assert_eq!(lines[5], "(2 rows)");
    }
}
