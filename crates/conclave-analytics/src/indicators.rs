//! Indicator engine.
//!
//! Every series is aligned 1:1 with the input bars. Bars before a lookback
//! window is filled hold `None`.
//!
//! - SMA(n): mean of the last n closes, defined from index n-1.
//! - EMA(n): alpha = 2 / (n + 1), seeded with the first value.
//! - RSI(n): Wilder smoothing, defined from index n. avg_loss == 0 gives 100,
//!   or 50 when avg_gain is also 0.
//! - MACD: EMA(fast) - EMA(slow) from index slow-1; signal is EMA(signal) of
//!   the line seeded at its first defined value; histogram = line - signal.
//! - Bollinger: SMA(n) ± k × population std-dev of the same window.

use chrono::NaiveDate;
use conclave_models::{IndicatorConfig, PriceBar};
use tracing::debug;

use crate::error::AnalyticsError;

pub type Series = Vec<Option<f64>>;

/// Derived per-bar indicator values for one price series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub sma_fast: Series,
    pub sma_slow: Series,
    pub rsi: Series,
    pub macd: Series,
    pub macd_signal: Series,
    pub macd_hist: Series,
    pub bb_upper: Series,
    pub bb_mid: Series,
    pub bb_lower: Series,
    /// Periods the set was computed with.
    pub config: IndicatorConfig,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values on the last bar, keyed by column name. Undefined values are `None`.
    pub fn latest_snapshot(&self) -> Vec<(String, Option<f64>)> {
        let c = &self.config;
        vec![
            (format!("sma_{}", c.sma_fast), last(&self.sma_fast)),
            (format!("sma_{}", c.sma_slow), last(&self.sma_slow)),
            (format!("rsi_{}", c.rsi_period), last(&self.rsi)),
            ("macd".to_string(), last(&self.macd)),
            ("macd_signal".to_string(), last(&self.macd_signal)),
            ("macd_hist".to_string(), last(&self.macd_hist)),
            ("bb_upper".to_string(), last(&self.bb_upper)),
            ("bb_mid".to_string(), last(&self.bb_mid)),
            ("bb_lower".to_string(), last(&self.bb_lower)),
        ]
    }
}

/// The value on the last bar, if defined there.
pub fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Check that bars are usable: non-empty, strictly increasing dates,
/// positive finite prices.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), AnalyticsError> {
    if bars.is_empty() {
        return Err(AnalyticsError::InvalidInput("empty price series".to_string()));
    }

    for (i, bar) in bars.iter().enumerate() {
        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalyticsError::InvalidInput(format!(
                    "non-positive {field} {value} on {}",
                    bar.date
                )));
            }
        }
        if !(bar.volume.is_finite() && bar.volume >= 0.0) {
            return Err(AnalyticsError::InvalidInput(format!(
                "invalid volume {} on {}",
                bar.volume, bar.date
            )));
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(AnalyticsError::InvalidInput(format!(
                "dates not strictly increasing: {} follows {}",
                bar.date,
                bars[i - 1].date
            )));
        }
    }
    Ok(())
}

/// Compute the full indicator set for a validated series.
pub fn compute(bars: &[PriceBar], config: &IndicatorConfig) -> Result<IndicatorSet, AnalyticsError> {
    validate_series(bars)?;

    let required = config.min_history();
    if bars.len() < required {
        return Err(AnalyticsError::InsufficientHistory {
            required,
            available: bars.len(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let (macd, macd_signal, macd_hist) =
        macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
    let (bb_upper, bb_mid, bb_lower) =
        bollinger(&closes, config.bollinger_period, config.bollinger_k);

    debug!(bars = bars.len(), "Computed indicators");

    Ok(IndicatorSet {
        dates: bars.iter().map(|b| b.date).collect(),
        sma_fast: sma(&closes, config.sma_fast),
        sma_slow: sma(&closes, config.sma_slow),
        rsi: rsi(&closes, config.rsi_period),
        macd,
        macd_signal,
        macd_hist,
        bb_upper,
        bb_mid,
        bb_lower,
        config: config.clone(),
    })
}

pub fn sma(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// Recursive EMA over every value, seeded with the first one.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            // Written as a correction so a constant input stays exactly constant.
            Some(p) => p + alpha * (v - p),
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

pub fn rsi(values: &[f64], period: usize) -> Series {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..values.len() {
        let change = changes[i - 1];
        avg_gain = (avg_gain * (period - 1) as f64 + gain(change)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(change)) / period as f64;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Returns (line, signal, histogram).
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> (Series, Series, Series) {
    let n = values.len();
    let mut line = vec![None; n];
    let mut sig = vec![None; n];
    let mut hist = vec![None; n];
    if fast == 0 || slow == 0 || signal == 0 || n < slow {
        return (line, sig, hist);
    }

    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);
    let line_start = slow - 1;
    let raw_line: Vec<f64> = (line_start..n).map(|i| ema_fast[i] - ema_slow[i]).collect();
    let raw_signal = ema(&raw_line, signal);

    for (offset, i) in (line_start..n).enumerate() {
        line[i] = Some(raw_line[offset]);
        if offset + 1 >= signal {
            let s = raw_signal[offset];
            sig[i] = Some(s);
            hist[i] = Some(raw_line[offset] - s);
        }
    }
    (line, sig, hist)
}

/// Population standard deviation over a trailing window.
pub fn rolling_std(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / period as f64;
            Some(variance.sqrt())
        })
        .collect()
}

/// Returns (upper, mid, lower).
pub fn bollinger(values: &[f64], period: usize, k: f64) -> (Series, Series, Series) {
    let mid = sma(values, period);
    let std = rolling_std(values, period);
    let upper = mid
        .iter()
        .zip(&std)
        .map(|(m, s)| Some((*m)? + k * (*s)?))
        .collect();
    let lower = mid
        .iter()
        .zip(&std)
        .map(|(m, s)| Some((*m)? - k * (*s)?))
        .collect();
    (upper, mid, lower)
}
