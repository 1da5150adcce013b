//! livraria - book catalog ingestion
//!
//! Looks books up through a text-generation source and registers them into
//! the SQLite catalog (authors, genres, publishers, books).

use anyhow::{Context as _, Result};
use clap::Parser as _;
use livraria_common::config::AppConfig;
use livraria_ingest::cli::{Cli, Command};
use livraria_ingest::report;
use livraria_ingest::{
    ingest, BookSource, BookStore, Catalog, FileSource, GroqClient, IngestSummary,
};
use std::io::Write;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.overrides()).context("load configuration")?;
    livraria_ingest::logging::init(&config.log_level)?;

    info!("Starting livraria v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());

    let mut catalog = Catalog::new(&config.database_path);
    catalog.connect().await.context("connect to database")?;

    let outcome = run(cli.command.unwrap_or(Command::Menu), &config, &mut catalog).await;

    catalog.disconnect().await?;
    outcome
}

async fn run(command: Command, config: &AppConfig, catalog: &mut Catalog) -> Result<()> {
    match command {
        Command::Menu => {
            // Listing tables works without an API key
            let source = match GroqClient::new(config.source.clone()) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            };
            let mut input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut out = std::io::stdout();
            livraria_ingest::menu::run(
                &mut input,
                &mut out,
                source.as_ref().map(|s| s as &dyn BookSource),
                catalog,
            )
            .await?;
        }
        Command::Ingest(args) => {
            let source = GroqClient::new(config.source.clone())?;
            let summary = ingest(&source, catalog, &args.query_text()).await?;
            print_summary(&summary)?;
        }
        Command::Import { file } => {
            let source = FileSource::new(&file);
            let summary = ingest(&source, catalog, &file.display().to_string()).await?;
            print_summary(&summary)?;
        }
        Command::List { table } => {
            let snapshot = catalog.select_table(&table).await?;
            print!("{}", report::render(&snapshot));
        }
    }
    Ok(())
}

fn print_summary(summary: &IngestSummary) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if summary.is_empty() {
        writeln!(out, "No books were processed.")?;
        return Ok(());
    }
    for (title, id) in &summary.inserted {
        writeln!(out, "saved  #{:<5} {}", id, title)?;
    }
    for (title, reason) in &summary.failed {
        writeln!(out, "failed        {}: {}", title, reason)?;
    }
    Ok(())
}
