//! Ticker News Digest binary entrypoint.
//! Parses options, sets up logging, runs one collection pass and exits.
//!
//! Exit status is non-zero only for fatal errors (bad configuration, store or
//! report writes). A run where every feed failed still exits 0.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticker_news_digest::{pipeline, Cli, RunConfig};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present; env-backed options (NEWS_TICKER, ...) can live there.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let cfg = RunConfig::from_cli(cli)?;
    tracing::info!(
        ticker = %cfg.ticker,
        query = %cfg.query,
        date = %cfg.date,
        sources = cfg.sources.len(),
        "starting run"
    );

    let outcome = pipeline::run(&cfg).await?;

    println!("Wrote {}", outcome.written.latest.display());
    println!("Wrote {}", outcome.written.dated.display());
    if let Some(site) = &outcome.written.site {
        println!("Wrote {}", site.latest.display());
    }
    Ok(())
}
