//! Test helpers: deterministic price series and scripted sentiment scorers.
//!
//! Used by unit tests in this crate and by integration tests in `tests/`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use conclave_models::{IndicatorConfig, MarketSnapshot, PriceBar, SentimentConfig};

use crate::context::AnalysisContext;
use crate::error::AgentError;
use crate::sentiment::{SentimentScore, SentimentScorer};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default()
}

/// Bars on consecutive calendar days with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = start_date();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::from_close(start + ChronoDuration::days(i as i64), close))
        .collect()
}

/// Constant closes.
pub fn flat_bars(count: usize, price: f64) -> Vec<PriceBar> {
    bars_from_closes(&vec![price; count])
}

/// Closes 100, 101, 102, ...
pub fn rising_bars(count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64).collect();
    bars_from_closes(&closes)
}

/// Closes 200, 199, 198, ... Keep `count` below 200.
pub fn falling_bars(count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| 200.0 - i as f64).collect();
    bars_from_closes(&closes)
}

/// Alternates between `center` and `center * (1 + swing)`.
pub fn zigzag_bars(count: usize, center: f64, swing: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| if i % 2 == 0 { center } else { center * (1.0 + swing) })
        .collect();
    bars_from_closes(&closes)
}

pub fn snapshot(symbol: &str, bars: Vec<PriceBar>) -> MarketSnapshot {
    MarketSnapshot {
        bars,
        ..MarketSnapshot::empty(symbol)
    }
}

/// Context with default indicator periods and no fundamentals or news.
///
/// Panics if the bars are not a valid series of at least 35 bars.
pub fn context_from_bars(symbol: &str, bars: Vec<PriceBar>) -> AnalysisContext {
    match AnalysisContext::build(snapshot(symbol, bars), &IndicatorConfig::default()) {
        Ok(ctx) => ctx,
        Err(e) => panic!("test bars must form a valid context: {e}"),
    }
}

#[derive(Debug, Clone)]
enum Script {
    Fixed(f64),
    Failing,
    Slow(f64, Duration),
}

/// Sentiment scorer with a canned outcome.
#[derive(Debug, Clone)]
pub struct ScriptedScorer {
    script: Script,
}

impl ScriptedScorer {
    pub fn fixed(score: f64) -> Self {
        Self {
            script: Script::Fixed(score),
        }
    }

    pub fn failing() -> Self {
        Self {
            script: Script::Failing,
        }
    }

    /// Sleeps for `delay` before answering.
    pub fn slow(score: f64, delay: Duration) -> Self {
        Self {
            script: Script::Slow(score, delay),
        }
    }
}

#[async_trait]
impl SentimentScorer for ScriptedScorer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn score(
        &self,
        _symbol: &str,
        headlines: &[String],
        _config: &SentimentConfig,
    ) -> Result<SentimentScore, AgentError> {
        let score = match self.script {
            Script::Fixed(score) => score,
            Script::Failing => return Err(AgentError::Cli("Scripted failure".to_string())),
            Script::Slow(score, delay) => {
                tokio::time::sleep(delay).await;
                score
            }
        };
        Ok(SentimentScore {
            score,
            rationale: format!("Scripted score over {} headlines", headlines.len()),
        })
    }
}
