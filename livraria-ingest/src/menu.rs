//! Interactive operator menu
//!
//! 1) register books by author, 2) list a table, 3) exit. Drives the ingest
//! pipeline and the report; holds no catalog logic of its own.

use crate::catalog::BookStore;
use crate::ingest::ingest;
use crate::report;
use crate::source::{author_query, BookSource};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::error;

const DEFAULT_TABLE: &str = "livros";

fn print_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "-------------------------------")?;
    writeln!(out, "1) Register books by author")?;
    writeln!(out, "2) List table contents")?;
    writeln!(out, "3) Exit")?;
    writeln!(out, "-------------------------------")?;
    out.flush()
}

async fn prompt<R, W>(input: &mut R, out: &mut W, label: &str) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Run the menu until the operator exits or input ends
pub async fn run<R, W>(
    input: &mut R,
    out: &mut W,
    source: Option<&dyn BookSource>,
    store: &mut dyn BookStore,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        print_menu(out)?;
        let Some(choice) = prompt(input, out, "> ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => {
                let Some(author) = prompt(input, out, "Author name: ").await? else {
                    return Ok(());
                };
                if author.is_empty() {
                    writeln!(out, "No author given.")?;
                    continue;
                }
                let Some(source) = source else {
                    writeln!(out, "Book source is not configured (set a Groq API key).")?;
                    continue;
                };
                match ingest(source, store, &author_query(&author)).await {
                    Ok(summary) if summary.is_empty() => writeln!(out, "No books were processed.")?,
                    Ok(summary) => {
                        writeln!(
                            out,
                            "{} book(s) saved, {} failed.",
                            summary.inserted.len(),
                            summary.failed.len()
                        )?;
                        for (title, reason) in &summary.failed {
                            writeln!(out, "  ! {}: {}", title, reason)?;
                        }
                    }
                    Err(e) => {
                        error!("Book search failed: {}", e);
                        let label = if e.is_batch_fatal() { "Fatal error" } else { "Error" };
                        writeln!(out, "{} while searching for books: {}", label, e)?;
                    }
                }
            }
            "2" => {
                let Some(table) = prompt(input, out, &format!("Table [{}]: ", DEFAULT_TABLE)).await?
                else {
                    return Ok(());
                };
                let table = if table.is_empty() { DEFAULT_TABLE } else { table.as_str() };
                writeln!(out)?;
                match store.select_table(table).await {
                    Ok(snapshot) => write!(out, "{}", report::render(&snapshot))?,
                    Err(e) => writeln!(out, "Could not read table '{}': {}", table, e)?,
                }
                writeln!(out)?;
            }
            "3" => return Ok(()),
            _ => writeln!(out, "Invalid option")?,
        }
    }
}
