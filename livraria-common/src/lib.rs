//! # Livraria Common Library
//!
//! Shared code for the livraria catalog tools including:
//! - Book record and catalog entity types
//! - Error taxonomy for the ingest pipeline
//! - Configuration loading
//! - Database bootstrap (schema creation)

pub mod config;
pub mod db;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{BookRecord, EntityKind};
