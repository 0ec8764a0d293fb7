//! Coarse retrospective evaluation of a decision.
//!
//! The position implied by the decision's first order is held, without
//! costs or rebalancing, across the replay window. Daily position return is
//! `weight * direction * (close[t] / close[t-1] - 1)`.

use conclave_models::{BacktestConfig, BacktestMetrics, BacktestWindow, Decision, PriceBar};
use tracing::debug;

use crate::error::AnalyticsError;
use crate::indicators::validate_series;
use crate::stats::{mean, population_std, ZERO_VARIANCE};

pub const MIN_BARS_AFTER_START: usize = BacktestConfig::MIN_BARS_AFTER_START;

pub fn evaluate(
    decision: &Decision,
    bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<BacktestMetrics, AnalyticsError> {
    validate_series(bars)?;

    let start = match config.window {
        BacktestWindow::InSample => 0,
        // An as_of before the first bar replays the whole series.
        BacktestWindow::Forward => bars
            .iter()
            .rposition(|b| b.date <= decision.as_of)
            .unwrap_or(0),
    };

    let available = bars.len() - start - 1;
    if available < MIN_BARS_AFTER_START {
        return Err(AnalyticsError::InsufficientHistory {
            required: MIN_BARS_AFTER_START,
            available,
        });
    }

    let end = match config.horizon_bars {
        Some(h) => (start + h).min(bars.len() - 1),
        None => bars.len() - 1,
    };

    let exposure = decision.weight() * decision.action().direction();
    let returns: Vec<f64> = bars[start..=end]
        .windows(2)
        .map(|w| exposure * (w[1].close / w[0].close - 1.0))
        .collect();

    let curve = equity_curve(&returns);
    let total_return = curve.last().copied().unwrap_or(1.0) - 1.0;
    let sharpe_ratio = sharpe(&returns, config.trading_days_per_year);
    let max_drawdown = max_drawdown(&curve);
    let annualized_return = annualize(total_return, returns.len(), config.trading_days_per_year);

    debug!(
        symbol = %decision.symbol,
        periods = returns.len(),
        total_return,
        "Backtest complete"
    );

    Ok(BacktestMetrics {
        total_return,
        sharpe_ratio,
        max_drawdown,
        annualized_return,
        start: bars[start].date,
        end: bars[end].date,
        periods: returns.len(),
    })
}

/// Compounded equity starting from 1.0 (the starting point is included).
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    let mut equity = 1.0;
    curve.push(equity);
    for r in returns {
        equity *= 1.0 + r;
        curve.push(equity);
    }
    curve
}

/// Annualized mean / std-dev. Zero-variance returns give exactly 0.
pub fn sharpe(returns: &[f64], periods_per_year: f64) -> f64 {
    let (Some(m), Some(std)) = (mean(returns), population_std(returns)) else {
        return 0.0;
    };
    let identical = returns.windows(2).all(|w| w[0] == w[1]);
    if identical || std <= ZERO_VARIANCE {
        return 0.0;
    }
    let ratio = m / std * periods_per_year.sqrt();
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Most negative peak-to-trough move of the curve, as a fraction <= 0.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &equity in curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min(equity / peak - 1.0);
        }
    }
    worst
}

fn annualize(total_return: f64, periods: usize, periods_per_year: f64) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let value = (1.0 + total_return).powf(periods_per_year / periods as f64) - 1.0;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use conclave_models::{Action, Order};

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
    }

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(day(i as i64), c))
            .collect()
    }

    fn decision(action: Action, weight: f64, as_of: NaiveDate) -> Decision {
        Decision {
            symbol: "TEST".to_string(),
            as_of,
            composite_score: 0.5,
            orders: vec![Order {
                symbol: "TEST".to_string(),
                action,
                weight,
                entry_rule: String::new(),
                stop: 0.08,
                take_profit: 0.2,
                rationale: String::new(),
            }],
            max_gross_exposure: 1.0,
            notes: String::new(),
            agent_reports: vec![],
        }
    }

    #[test]
    fn full_long_position_tracks_price() {
        let bars = bars_from_closes(&[100.0, 110.0, 121.0]);
        let metrics = evaluate(
            &decision(Action::Buy, 1.0, day(2)),
            &bars,
            &BacktestConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(metrics.total_return, 0.21, epsilon = 1e-12);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.periods, 2);
        assert_eq!(metrics.start, day(0));
        assert_eq!(metrics.end, day(2));
    }

    #[test]
    fn identical_returns_have_zero_sharpe() {
        let bars = bars_from_closes(&[100.0, 110.0, 121.0, 133.1]);
        let metrics = evaluate(
            &decision(Action::Buy, 1.0, day(3)),
            &bars,
            &BacktestConfig::default(),
        )
        .unwrap();
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn hold_is_flat() {
        let bars = bars_from_closes(&[100.0, 90.0, 120.0, 80.0]);
        let metrics = evaluate(
            &decision(Action::Hold, 0.0, day(3)),
            &bars,
            &BacktestConfig::default(),
        )
        .unwrap();
        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn short_profits_from_decline() {
        let bars = bars_from_closes(&[100.0, 90.0, 81.0]);
        let metrics = evaluate(
            &decision(Action::Sell, 0.5, day(2)),
            &bars,
            &BacktestConfig::default(),
        )
        .unwrap();
        // Each day the position earns 0.5 * 10%.
        assert_relative_eq!(metrics.total_return, 1.05 * 1.05 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_is_non_positive() {
        let bars = bars_from_closes(&[100.0, 120.0, 90.0, 95.0]);
        let metrics = evaluate(
            &decision(Action::Buy, 1.0, day(3)),
            &bars,
            &BacktestConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(metrics.max_drawdown, 90.0 / 120.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn forward_window_starts_at_as_of() {
        let bars = bars_from_closes(&[100.0, 50.0, 100.0, 110.0, 121.0]);
        let config = BacktestConfig {
            window: BacktestWindow::Forward,
            ..BacktestConfig::default()
        };
        let metrics = evaluate(&decision(Action::Buy, 1.0, day(2)), &bars, &config).unwrap();
        assert_eq!(metrics.start, day(2));
        assert_eq!(metrics.periods, 2);
        assert_relative_eq!(metrics.total_return, 0.21, epsilon = 1e-12);
    }

    #[test]
    fn forward_window_needs_two_bars_after_as_of() {
        let bars = bars_from_closes(&[100.0, 101.0, 102.0, 103.0]);
        let config = BacktestConfig {
            window: BacktestWindow::Forward,
            ..BacktestConfig::default()
        };
        let err = evaluate(&decision(Action::Buy, 1.0, day(2)), &bars, &config).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InsufficientHistory {
                required: 2,
                available: 1
            }
        );
    }

    #[test]
    fn horizon_limits_periods() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let config = BacktestConfig {
            horizon_bars: Some(5),
            ..BacktestConfig::default()
        };
        let metrics = evaluate(
            &decision(Action::Buy, 1.0, day(29)),
            &bars_from_closes(&closes),
            &config,
        )
        .unwrap();
        assert_eq!(metrics.periods, 5);
        assert_relative_eq!(metrics.total_return, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn empty_series_is_invalid() {
        let err = evaluate(
            &decision(Action::Buy, 1.0, day(0)),
            &[],
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn sharpe_sign_follows_mean() {
        assert!(sharpe(&[0.01, 0.02, -0.005], 252.0) > 0.0);
        assert!(sharpe(&[-0.01, -0.02, 0.005], 252.0) < 0.0);
        assert_eq!(sharpe(&[], 252.0), 0.0);
    }
}
