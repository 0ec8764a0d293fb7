use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Bar whose open/high/low all equal the close. Handy for synthetic series.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Everything the market-data collaborator hands over for one symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub bars: Vec<PriceBar>,
    /// Sparse fundamentals (e.g. `pe_ratio`, `pb_ratio`, `dividend_yield`).
    #[serde(default)]
    pub fundamentals: BTreeMap<String, f64>,
    /// Headlines or short news summaries, newest last.
    #[serde(default)]
    pub news: Vec<String>,
}

impl MarketSnapshot {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Self::default()
        }
    }
}

/// Inclusive date filter applied to price history. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Keep only the bars inside the range, preserving order.
    pub fn filter(&self, bars: Vec<PriceBar>) -> Vec<PriceBar> {
        bars.into_iter().filter(|b| self.contains(b.date)).collect()
    }
}
