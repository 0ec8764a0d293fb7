use async_trait::async_trait;
use conclave_analytics::indicators::last;
use conclave_analytics::stats::clamp;
use conclave_models::{AgentReport, CommitteeConfig, Domain};

use crate::analyst::Analyst;
use crate::context::AnalysisContext;

/// Relative tolerance under which two indicator values count as equal.
const TIE_TOLERANCE: f64 = 1e-9;

/// Scores trend, momentum, RSI regime and band position on the last bar.
#[derive(Debug, Clone)]
pub struct TechnicalAnalyst {
    name: String,
}

impl Default for TechnicalAnalyst {
    fn default() -> Self {
        Self {
            name: "Technical Analyst".to_string(),
        }
    }
}

fn is_tie(a: f64, b: f64, scale: f64) -> bool {
    (a - b).abs() <= TIE_TOLERANCE * scale.abs().max(1.0)
}

/// Per-signal contributions on the last bar, in evaluation order.
fn score_signals(ctx: &AnalysisContext, config: &CommitteeConfig) -> Option<(f64, Vec<String>)> {
    let ind = &ctx.indicators;
    let tech = &config.technical;
    let close = ctx.latest_bar()?.close;

    let sma_fast = last(&ind.sma_fast);
    let sma_slow = last(&ind.sma_slow);
    let hist = last(&ind.macd_hist);
    let rsi = last(&ind.rsi);
    let bands = last(&ind.bb_lower).zip(last(&ind.bb_upper));

    if (sma_fast.is_none() || sma_slow.is_none())
        && hist.is_none()
        && rsi.is_none()
        && bands.is_none()
    {
        return None;
    }

    let mut score = 0.0;
    let mut signals = Vec::new();

    if let (Some(fast), Some(slow)) = (sma_fast, sma_slow) {
        let (f, s) = (ind.config.sma_fast, ind.config.sma_slow);
        if !is_tie(fast, slow, slow) {
            if fast > slow {
                score += tech.trend_weight;
                signals.push(format!("SMA{f} above SMA{s}"));
            } else {
                score -= tech.trend_weight;
                signals.push(format!("SMA{f} below SMA{s}"));
            }
        }
    }

    if let Some(hist) = hist {
        if !is_tie(hist, 0.0, close) {
            if hist > 0.0 {
                score += tech.macd_weight;
                signals.push("MACD histogram positive".to_string());
            } else {
                score -= tech.macd_weight;
                signals.push("MACD histogram negative".to_string());
            }
        }
    }

    if let Some(rsi) = rsi {
        if rsi > tech.rsi_overbought {
            score -= tech.rsi_weight;
            signals.push(format!("RSI overbought ({rsi:.1})"));
        } else if rsi < tech.rsi_oversold {
            // Oversold reads as momentum breaking down, not as a rebound call.
            score -= tech.rsi_weight;
            signals.push(format!("RSI oversold ({rsi:.1})"));
        } else if is_tie(rsi, 50.0, 50.0) {
            // Dead centre carries no information.
        } else if rsi > 50.0 {
            score += tech.rsi_weight / 2.0;
            signals.push(format!("RSI neutral-positive ({rsi:.1})"));
        } else {
            score -= tech.rsi_weight / 2.0;
            signals.push(format!("RSI neutral-negative ({rsi:.1})"));
        }
    }

    if let Some((lower, upper)) = bands {
        if close < lower && !is_tie(close, lower, close) {
            score += tech.band_weight;
            signals.push("Price below lower Bollinger band".to_string());
        } else if close > upper && !is_tie(close, upper, close) {
            score -= tech.band_weight;
            signals.push("Price above upper Bollinger band".to_string());
        }
    }

    Some((clamp(score, -1.0, 1.0), signals))
}

#[async_trait]
impl Analyst for TechnicalAnalyst {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        Domain::Technical
    }

    async fn analyze(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> AgentReport {
        let Some((score, signals)) = score_signals(ctx, config) else {
            return AgentReport::neutral(
                &self.name,
                Domain::Technical,
                "Insufficient price history to compute indicators",
            )
            .with_metadata(serde_json::json!({
                "indicators_available": false,
                "price_points": ctx.bars.len(),
                "required_points": ctx.indicators.config.min_history(),
            }));
        };

        let latest: serde_json::Map<String, serde_json::Value> = ctx
            .indicators
            .latest_snapshot()
            .into_iter()
            .map(|(k, v)| (k, v.map_or(serde_json::Value::Null, serde_json::Value::from)))
            .collect();

        let rationale = if signals.is_empty() {
            "No technical signal fired".to_string()
        } else {
            signals.join("; ")
        };

        AgentReport {
            agent_name: self.name.clone(),
            domain: Domain::Technical,
            score,
            rationale,
            signals,
            metadata: serde_json::json!({
                "close": ctx.latest_bar().map(|b| b.close),
                "latest_indicators": latest,
            }),
        }
    }
}
