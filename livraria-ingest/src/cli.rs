//! Command-line interface

use clap::{Args, Parser, Subcommand};
use livraria_common::config::{CliOverrides, ENV_CONFIG, ENV_DATABASE};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "livraria", version, about = "Register books into the livraria catalog")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            database_path: self.database.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (default)
    Menu,
    /// Ask the book source for books and register them
    Ingest(IngestArgs),
    /// Register books from a local catalog file (delimited or JSON)
    Import {
        file: PathBuf,
    },
    /// Print the contents of a table
    List {
        #[arg(default_value = "livros")]
        table: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct IngestArgs {
    /// Register every book by this author
    #[arg(long)]
    pub author: Option<String>,

    /// Free-text query sent to the source as-is
    #[arg(long)]
    pub query: Option<String>,
}

impl IngestArgs {
    pub fn query_text(&self) -> String {
        match (&self.author, &self.query) {
            (Some(author), _) => crate::source::author_query(author),
            (None, Some(query)) => query.clone(),
            (None, None) => String::new(),
        }
    }
}
