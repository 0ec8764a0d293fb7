use std::collections::BTreeMap;

use chrono::NaiveDate;
use conclave_analytics::{compute, IndicatorSet};
use conclave_models::{IndicatorConfig, MarketSnapshot, PriceBar};

use crate::error::AgentError;

/// Everything the agents know about one symbol for one run.
///
/// Built once, before any agent runs, and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub indicators: IndicatorSet,
    pub fundamentals: BTreeMap<String, f64>,
    pub news: Vec<String>,
}

impl AnalysisContext {
    /// Validate the price series and compute its indicators.
    pub fn build(snapshot: MarketSnapshot, config: &IndicatorConfig) -> Result<Self, AgentError> {
        let indicators = compute(&snapshot.bars, config)?;
        Ok(Self {
            symbol: snapshot.symbol,
            bars: snapshot.bars,
            indicators,
            fundamentals: snapshot.fundamentals,
            news: snapshot.news,
        })
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Last bar. `build` guarantees one exists.
    pub fn latest_bar(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.latest_bar().map(|b| b.date)
    }
}
