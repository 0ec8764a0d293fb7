//! Conclave: a simulated investment committee.
//!
//! Independent analysts score each symbol from technical, fundamental,
//! sentiment and risk angles; a portfolio manager merges the scores into a
//! sized decision, which is then replayed against the price history.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use conclave::cache::StaticSource;
//! use conclave::models::{CommitteeConfig, DateRange};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = CommitteeConfig::default();
//! let source = Arc::new(StaticSource::from_json_file("snapshots.json")?);
//! let meeting = conclave::build_meeting(config, source);
//! let outcome = conclave::run(&meeting, &["AAPL".to_string()], DateRange::default()).await;
//! # Ok(())
//! # }
//! ```

pub use conclave_agents as agents;
pub use conclave_analytics as analytics;
pub use conclave_cache as cache;
pub use conclave_models as models;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use conclave_agents::{
    default_analysts, ClaudeSentimentScorer, LexiconScorer, Meeting, MeetingOutcome, RiskOfficer,
    SentimentScorer,
};
use conclave_cache::{CacheReader, CacheSource, MarketDataSource, StaticSource};
use conclave_models::{CacheConfig, CommitteeConfig, DateRange, ScorerKind, SentimentConfig};

/// Read and validate a TOML config. `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CommitteeConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str(&text).context("Failed to parse config")?
        }
        None => CommitteeConfig::default(),
    };
    config.validate().context("Invalid config")?;
    Ok(config)
}

/// The sentiment scorer selected by `[sentiment] scorer`.
pub fn scorer_for(config: &SentimentConfig) -> Arc<dyn SentimentScorer> {
    match config.scorer {
        ScorerKind::Lexicon => Arc::new(LexiconScorer),
        ScorerKind::Claude => Arc::new(ClaudeSentimentScorer),
    }
}

/// Market data from the shared SQLite cache, opened read-only.
pub fn cache_source(config: &CacheConfig) -> anyhow::Result<Arc<dyn MarketDataSource>> {
    let reader = CacheReader::from_config(config)
        .with_context(|| format!("Failed to open cache DB: {}", config.sqlite_path))?;
    Ok(Arc::new(CacheSource::new(Arc::new(reader))))
}

/// Market data from a JSON array of snapshots.
pub fn snapshot_source(path: &Path) -> anyhow::Result<StaticSource> {
    StaticSource::from_json_file(path)
        .with_context(|| format!("Failed to load snapshots: {}", path.display()))
}

/// Assemble the committee: the three directional analysts, the risk officer
/// and the configured sentiment scorer.
pub fn build_meeting(config: CommitteeConfig, source: Arc<dyn MarketDataSource>) -> Meeting {
    let analysts = default_analysts(scorer_for(&config.sentiment));
    Meeting::new(source, analysts, RiskOfficer::default(), config)
}

pub async fn run(meeting: &Meeting, symbols: &[String], range: DateRange) -> MeetingOutcome {
    meeting.run(symbols, range).await
}
