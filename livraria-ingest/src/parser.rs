//! Catalog response parsing
//!
//! Two payload shapes come back from a book source:
//! - delimited: `{titulo,autor,genero,sinopse,ano,editora,origem,paginas,isbn},{...}`
//! - JSON: `{"livros": [{"titulo": ..., "ISBN": ...}, ...]}`
//!
//! Malformed books are dropped with a warning; the rest of the batch survives.

use livraria_common::{BookRecord, Error, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::warn;

/// Logical fields per book
pub const FIELD_COUNT: usize = 9;

/// Fields before the synopsis in the delimited format
const LEADING_FIELDS: usize = 3;

/// Fields after the synopsis in the delimited format
const TRAILING_FIELDS: usize = 5;

/// Raw text returned by a book source, tagged with its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCatalog {
    Delimited(String),
    Json(String),
}

impl RawCatalog {
    /// Classify text: a JSON object is `Json`, anything else `Delimited`
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        match serde_json::from_str::<serde_json::Value>(text.trim()) {
            Ok(value) if value.is_object() => RawCatalog::Json(text),
            _ => RawCatalog::Delimited(text),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RawCatalog::Delimited(text) | RawCatalog::Json(text) => text,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Parse a raw catalog into book records, in input order
///
/// Blank input yields an empty batch. Only a JSON payload without a `livros`
/// array is an error (`SourceUnavailable`); bad individual books are dropped.
pub fn parse(raw: &RawCatalog) -> Result<Vec<BookRecord>> {
    if raw.is_blank() {
        return Ok(Vec::new());
    }

    match raw {
        RawCatalog::Delimited(text) => Ok(parse_delimited(text)),
        RawCatalog::Json(text) => parse_json(text),
    }
}

/// Parse the `{...},{...}` format, dropping malformed groups
pub fn parse_delimited(text: &str) -> Vec<BookRecord> {
    let body = text.trim();
    let body = body.strip_prefix('{').unwrap_or(body);
    let body = body.strip_suffix('}').unwrap_or(body);

    if body.trim().is_empty() {
        return Vec::new();
    }

    split_groups(body)
        .into_iter()
        .filter_map(|group| match parse_group(group) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed book record: {}", e);
                None
            }
        })
        .collect()
}

/// Split a delimited body on `},{` (whitespace allowed after the comma)
fn split_groups(body: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut search = 0;

    while let Some(rel) = body[search..].find("},") {
        let close = search + rel;
        let after = &body[close + 2..];
        let open = close + 2 + (after.len() - after.trim_start().len());

        if body[open..].starts_with('{') {
            groups.push(&body[start..close]);
            start = open + 1;
            search = start;
        } else {
            search = close + 2;
        }
    }

    groups.push(&body[start..]);
    groups
}

/// Parse one comma-delimited book group
///
/// The synopsis is the only free-text field likely to hold commas, so the
/// first three and last five fields are taken from the ends and everything
/// between them is kept verbatim as the synopsis.
pub fn parse_group(group: &str) -> Result<BookRecord> {
    let commas: Vec<usize> = group.match_indices(',').map(|(i, _)| i).collect();
    if commas.len() < FIELD_COUNT - 1 {
        return Err(Error::InputFormat(format!(
            "expected {} fields, found {}: {}",
            FIELD_COUNT,
            commas.len() + 1,
            group.trim()
        )));
    }

    let synopsis_start = commas[LEADING_FIELDS - 1] + 1;
    let synopsis_end = commas[commas.len() - TRAILING_FIELDS];

    let leading: Vec<&str> = group[..synopsis_start - 1].split(',').collect();
    let trailing: Vec<&str> = group[synopsis_end + 1..].split(',').collect();

    let fields = [
        leading[0],
        leading[1],
        leading[2],
        &group[synopsis_start..synopsis_end],
        trailing[0],
        trailing[1],
        trailing[2],
        trailing[3],
        trailing[4],
    ]
    .map(str::trim);

    let non_empty = fields.iter().filter(|f| !f.is_empty()).count();
    if non_empty < FIELD_COUNT {
        return Err(Error::InputFormat(format!(
            "expected {} non-empty fields, found {}: {}",
            FIELD_COUNT,
            non_empty,
            group.trim()
        )));
    }

    Ok(BookRecord {
        title: fields[0].to_string(),
        author: fields[1].to_string(),
        genre: fields[2].to_string(),
        synopsis: fields[3].to_string(),
        publication_year: parse_int("publication year", fields[4], group)?,
        publisher: fields[5].to_string(),
        origin: fields[6].to_string(),
        page_count: parse_int("page count", fields[7], group)?,
        isbn: fields[8].to_string(),
    })
}

fn parse_int(field: &str, value: &str, group: &str) -> Result<i32> {
    value.parse().map_err(|_| {
        Error::InputFormat(format!(
            "{} '{}' is not an integer: {}",
            field,
            value,
            group.trim()
        ))
    })
}

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    livros: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonBook {
    titulo: String,
    autor: String,
    genero: String,
    sinopse: String,
    #[serde(deserialize_with = "lenient_int")]
    anodepublicacao: i32,
    editora: String,
    origem: String,
    #[serde(deserialize_with = "lenient_int")]
    numerodepaginas: i32,
    #[serde(rename = "ISBN", alias = "isbn")]
    isbn: String,
}

/// Model output sometimes quotes numbers; accept both `1954` and `"1954"`
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrText {
        Int(i64),
        Text(String),
    }

    match IntOrText::deserialize(deserializer)? {
        IntOrText::Int(n) => i32::try_from(n).map_err(de::Error::custom),
        IntOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("'{}' is not an integer", s))),
    }
}

/// Parse the `{"livros": [...]}` envelope
pub fn parse_json(text: &str) -> Result<Vec<BookRecord>> {
    let envelope: CatalogEnvelope = serde_json::from_str(text.trim())
        .map_err(|e| Error::SourceUnavailable(format!("catalog JSON is invalid: {}", e)))?;

    let records = envelope
        .livros
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match json_record(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed book #{}: {}", index + 1, e);
                None
            }
        })
        .collect();

    Ok(records)
}

fn json_record(value: serde_json::Value) -> Result<BookRecord> {
    let book: JsonBook =
        serde_json::from_value(value).map_err(|e| Error::InputFormat(e.to_string()))?;

    let record = BookRecord {
        title: book.titulo.trim().to_string(),
        author: book.autor.trim().to_string(),
        genre: book.genero.trim().to_string(),
        synopsis: book.sinopse.trim().to_string(),
        publication_year: book.anodepublicacao,
        publisher: book.editora.trim().to_string(),
        origin: book.origem.trim().to_string(),
        page_count: book.numerodepaginas,
        isbn: book.isbn.trim().to_string(),
    };

    let text_fields = [
        &record.title,
        &record.author,
        &record.genre,
        &record.synopsis,
        &record.publisher,
        &record.origin,
        &record.isbn,
    ];
    if text_fields.iter().any(|f| f.is_empty()) {
        return Err(Error::InputFormat(format!(
            "book '{}' has empty fields",
            record.title
        )));
    }

    Ok(record)
}

/// Remove a surrounding markdown code fence (```json ... ```) from model output
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
