use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use conclave_models::cache_schema::key_patterns;
use conclave_models::{DateRange, MarketSnapshot, PriceBar};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::reader::CacheReader;

/// Supplies price history, fundamentals and news for a symbol.
///
/// Missing fundamentals or news are not errors; they come back empty.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn load(&self, symbol: &str, range: &DateRange) -> Result<MarketSnapshot, CacheError>;
}

/// Market data read from the shared SQLite cache.
pub struct CacheSource {
    reader: Arc<CacheReader>,
}

impl CacheSource {
    pub fn new(reader: Arc<CacheReader>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl MarketDataSource for CacheSource {
    async fn load(&self, symbol: &str, range: &DateRange) -> Result<MarketSnapshot, CacheError> {
        let bars: Vec<PriceBar> = self
            .reader
            .get(&key_patterns::daily_bars(symbol))
            .await?
            .unwrap_or_default();

        let fundamentals = self
            .reader
            .get::<serde_json::Map<String, serde_json::Value>>(&key_patterns::fundamentals(symbol))
            .await?
            .map(numeric_fields)
            .unwrap_or_default();

        let news: Vec<String> = self
            .reader
            .get(&key_patterns::news(symbol))
            .await?
            .unwrap_or_default();

        if bars.is_empty() {
            warn!(symbol, "No cached price history");
        }
        debug!(
            symbol,
            bars = bars.len(),
            fundamentals = fundamentals.len(),
            news = news.len(),
            "Loaded snapshot from cache"
        );

        Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            bars: range.filter(bars),
            fundamentals,
            news,
        })
    }
}

/// Keep finite numeric metrics; nulls and non-numbers are dropped.
fn numeric_fields(map: serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, f64> {
    map.into_iter()
        .filter_map(|(k, v)| v.as_f64().filter(|x| x.is_finite()).map(|x| (k, x)))
        .collect()
}

/// Fixed, in-memory snapshots. Unknown symbols load as empty snapshots.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    snapshots: BTreeMap<String, MarketSnapshot>,
}

impl StaticSource {
    pub fn new(snapshots: impl IntoIterator<Item = MarketSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|s| (s.symbol.clone(), s))
                .collect(),
        }
    }

    /// Read a JSON array of snapshots from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path)?;
        let snapshots: Vec<MarketSnapshot> = serde_json::from_str(&text)?;
        Ok(Self::new(snapshots))
    }

    pub fn symbols(&self) -> Vec<String> {
        self.snapshots.keys().cloned().collect()
    }
}

#[async_trait]
impl MarketDataSource for StaticSource {
    async fn load(&self, symbol: &str, range: &DateRange) -> Result<MarketSnapshot, CacheError> {
        let mut snapshot = self
            .snapshots
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| MarketSnapshot::empty(symbol));
        snapshot.bars = range.filter(snapshot.bars);
        Ok(snapshot)
    }
}
