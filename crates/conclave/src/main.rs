use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use conclave_cache::MarketDataSource;
use conclave_models::DateRange;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "conclave",
    about = "Investment committee simulator - scores symbols with independent analysts and backtests the decision"
)]
struct Cli {
    /// Symbols to analyze. With --input and no symbols, every snapshot in the file is analyzed.
    symbols: Vec<String>,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read market snapshots from a JSON file instead of the SQLite cache
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// First bar date to use (inclusive, YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last bar date to use (inclusive, YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Write the decisions JSON to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = conclave::load_config(cli.config.as_deref())?;

    let (source, mut symbols): (Arc<dyn MarketDataSource>, Vec<String>) = match &cli.input {
        Some(path) => {
            let source = conclave::snapshot_source(path)?;
            let known = source.symbols();
            (Arc::new(source), known)
        }
        None => (conclave::cache_source(&config.cache)?, Vec::new()),
    };
    if !cli.symbols.is_empty() {
        symbols = cli.symbols.clone();
    }
    if symbols.is_empty() {
        anyhow::bail!("No symbols to analyze");
    }

    let meeting = conclave::build_meeting(config, source);
    let outcome = conclave::run(&meeting, &symbols, DateRange::new(cli.start, cli.end)).await;

    for (symbol, reason) in &outcome.failures {
        warn!(symbol = %symbol, reason = %reason, "No decision");
    }
    if outcome.decisions.is_empty() {
        anyhow::bail!("Every symbol failed ({} total)", outcome.failures.len());
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&outcome.decisions)?
    } else {
        serde_json::to_string(&outcome.decisions)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{output}\n"))
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(path = %path.display(), decisions = outcome.decisions.len(), "Wrote decisions");
        }
        None => println!("{output}"),
    }

    Ok(())
}
