//! Common error types for livraria

use crate::types::EntityKind;
use thiserror::Error;

/// Common result type for livraria operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the parser, sources and catalog store
///
/// Each variant maps to one recovery policy:
/// - `InputFormat`: drop the single record, keep the batch going
/// - `SourceUnavailable`: abort the whole ingestion call
/// - `Resolution` / `Persistence` / `Database`: roll back one book, continue
/// - `ConnectionState`: refuse the operation, never reconnect implicitly
/// - `InvalidTableName`: report to the operator, nothing is queried
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {}", describe_db_error(.0))]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A catalog record group is malformed (too few fields, bad integers)
    #[error("Invalid record: {0}")]
    InputFormat(String),

    /// The external text source failed or returned an unusable payload
    #[error("Book source unavailable: {0}")]
    SourceUnavailable(String),

    /// Entity lookup or creation failed
    #[error("Failed to resolve {kind} '{name}' in table '{}': {reason}", .kind.table())]
    Resolution {
        kind: EntityKind,
        name: String,
        reason: String,
    },

    /// Book row could not be written
    #[error("Failed to persist book '{title}': {reason}")]
    Persistence { title: String, reason: String },

    /// Storage connection is absent or closed
    #[error("Connection state error: {0}")]
    ConnectionState(String),

    /// Table name rejected by a report query
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
}

impl Error {
    /// Build a resolution error from an underlying engine failure
    pub fn resolution(kind: EntityKind, name: &str, err: &sqlx::Error) -> Self {
        Error::Resolution {
            kind,
            name: name.to_string(),
            reason: describe_db_error(err),
        }
    }

    /// Whether this error aborts an entire ingestion call rather than a single book
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable(_) | Error::ConnectionState(_) | Error::Config(_)
        )
    }
}

/// Render a sqlx error with the engine's error code when one is available
pub fn describe_db_error(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("{} (code {})", db_err.message(), code),
            None => db_err.message().to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_fatal_classification() {
        assert!(Error::SourceUnavailable("HTTP 500".into()).is_batch_fatal());
        assert!(Error::ConnectionState("closed".into()).is_batch_fatal());
        assert!(!Error::InputFormat("3 fields".into()).is_batch_fatal());
        assert!(!Error::Persistence {
            title: "Capitães da Areia".into(),
            reason: "no rows".into()
        }
        .is_batch_fatal());
    }

    #[test]
    fn test_resolution_message_names_table() {
        let err = Error::Resolution {
            kind: EntityKind::Publisher,
            name: "Companhia das Letras".into(),
            reason: "UNIQUE constraint failed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("editoras"));
        assert!(msg.contains("Companhia das Letras"));
    }
}
