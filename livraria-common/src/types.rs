//! Catalog record and entity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One book as parsed from a catalog response, before persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    /// Genre label; may be a comma-joined list where only the first entry counts
    pub genre: String,
    pub synopsis: String,
    pub publication_year: i32,
    pub publisher: String,
    /// Country or language of origin
    pub origin: String,
    pub page_count: i32,
    pub isbn: String,
}

impl BookRecord {
    /// Genre used for entity resolution: text before the first comma, trimmed
    pub fn primary_genre(&self) -> &str {
        self.genre.split(',').next().unwrap_or_default().trim()
    }
}

/// Deduplicated entity tables referenced by `livros`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Genre,
    Publisher,
}

impl EntityKind {
    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Author => "autores",
            EntityKind::Genre => "generos",
            EntityKind::Publisher => "editoras",
        }
    }

    /// Nullable secondary attribute column, if the table has one
    pub fn secondary_column(self) -> Option<&'static str> {
        match self {
            EntityKind::Author => Some("nacionalidade"),
            EntityKind::Genre => None,
            EntityKind::Publisher => Some("pais_origem"),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Author => "author",
            EntityKind::Genre => "genre",
            EntityKind::Publisher => "publisher",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_genre(genre: &str) -> BookRecord {
        BookRecord {
            title: "Mar Morto".to_string(),
            author: "Jorge Amado".to_string(),
            genre: genre.to_string(),
            synopsis: "Histórias do cais da Bahia.".to_string(),
            publication_year: 1936,
            publisher: "José Olympio".to_string(),
            origin: "Brasil".to_string(),
            page_count: 280,
            isbn: "978-8535914061".to_string(),
        }
    }

    #[test]
    fn test_primary_genre_takes_first_entry() {
        assert_eq!(record_with_genre("Ficção, Aventura").primary_genre(), "Ficção");
        assert_eq!(record_with_genre("Romance").primary_genre(), "Romance");
        assert_eq!(record_with_genre("  Drama ,Tragédia").primary_genre(), "Drama");
    }

    #[test]
    fn test_entity_tables() {
        assert_eq!(EntityKind::Author.table(), "autores");
        assert_eq!(EntityKind::Genre.secondary_column(), None);
        assert_eq!(EntityKind::Publisher.secondary_column(), Some("pais_origem"));
    }
}
