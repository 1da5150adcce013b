//! Tracing subscriber setup
//!
//! Logs go to stderr so table output on stdout stays clean. `RUST_LOG`
//! overrides the configured level.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

pub fn init(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
