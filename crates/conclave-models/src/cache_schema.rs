use serde::{Deserialize, Serialize};

/// Categories for organizing cache keys.
/// Data pipelines use these when writing to the shared SQLite cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    MarketData,
    Fundamentals,
    News,
}

impl CacheCategory {
    /// Value stored in the `category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::MarketData => "market_data",
            CacheCategory::Fundamentals => "fundamentals",
            CacheCategory::News => "news",
        }
    }
}

/// The table a data pipeline writes and the committee reads.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS cache_entries (
///     key         TEXT PRIMARY KEY,
///     category    TEXT NOT NULL,
///     value_json  TEXT NOT NULL,
///     source      TEXT NOT NULL,
///     symbol      TEXT,
///     created_at  TEXT NOT NULL,
///     expires_at  TEXT NOT NULL,
///     updated_at  TEXT NOT NULL
/// );
/// ```
pub const CACHE_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS cache_entries (
    key         TEXT PRIMARY KEY,
    category    TEXT NOT NULL,
    value_json  TEXT NOT NULL,
    source      TEXT NOT NULL,
    symbol      TEXT,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cache_category ON cache_entries(category);
CREATE INDEX IF NOT EXISTS idx_cache_symbol ON cache_entries(symbol);
CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
";

/// Key conventions for market snapshots.
///
/// - Daily bars: `bars:{symbol}:1d`, a JSON array of `PriceBar`
/// - Fundamentals: `fundamentals:{symbol}`, a JSON object of metric name to number
/// - News: `news:{symbol}`, a JSON array of headline strings
pub mod key_patterns {
    pub fn bars(symbol: &str, timeframe: &str) -> String {
        format!("bars:{symbol}:{timeframe}")
    }

    pub fn daily_bars(symbol: &str) -> String {
        bars(symbol, "1d")
    }

    pub fn fundamentals(symbol: &str) -> String {
        format!("fundamentals:{symbol}")
    }

    pub fn news(symbol: &str) -> String {
        format!("news:{symbol}")
    }
}

/// A raw cache row as read from SQLite.
#[derive(Debug, Clone)]
pub struct CacheRow {
    pub key: String,
    pub category: String,
    pub value_json: String,
    pub source: String,
    pub symbol: Option<String>,
    pub created_at: String,
    pub expires_at: String,
    pub updated_at: String,
}
