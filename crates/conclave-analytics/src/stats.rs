//! Return and dispersion helpers shared by the risk officer and the backtest.

/// Standard deviations at or below this are treated as zero variance.
pub const ZERO_VARIANCE: f64 = 1e-12;

/// Close-to-close simple returns: `close[t] / close[t-1] - 1`.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by N).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Annualized realized volatility of the last `lookback` returns of `closes`.
///
/// Returns 0.0 when fewer than two returns are available.
pub fn annualized_volatility(closes: &[f64], lookback: usize, periods_per_year: f64) -> f64 {
    let returns = simple_returns(closes);
    let window = &returns[returns.len().saturating_sub(lookback)..];
    if window.len() < 2 {
        return 0.0;
    }
    let std = population_std(window).unwrap_or(0.0);
    let vol = std * periods_per_year.sqrt();
    if vol.is_finite() {
        vol
    } else {
        0.0
    }
}

pub fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    if value.is_nan() {
        return lower.max(0.0).min(upper);
    }
    value.max(lower).min(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn returns_of_doubling_series() {
        let r = simple_returns(&[1.0, 2.0, 4.0]);
        assert_eq!(r, vec![1.0, 1.0]);
    }

    #[test]
    fn returns_of_single_price_is_empty() {
        assert!(simple_returns(&[100.0]).is_empty());
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std(&[]), None);
    }

    #[test]
    fn population_std_matches_hand_calculation() {
        // mean 5, squared deviations sum to 32 over 8 values
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std(&values).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_prices_have_zero_volatility() {
        let closes = vec![50.0; 80];
        assert_eq!(annualized_volatility(&closes, 60, 252.0), 0.0);
    }

    #[test]
    fn too_few_returns_have_zero_volatility() {
        assert_eq!(annualized_volatility(&[100.0, 101.0], 60, 252.0), 0.0);
    }

    #[test]
    fn volatility_uses_only_the_lookback_window() {
        // Wild swings early, calm afterwards: a short lookback ignores the swings.
        let mut closes = vec![100.0, 150.0, 80.0, 160.0, 90.0];
        closes.extend(std::iter::repeat(90.0).take(20));
        assert_eq!(annualized_volatility(&closes, 10, 252.0), 0.0);
        assert!(annualized_volatility(&closes, 30, 252.0) > 0.0);
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp(f64::NAN, -1.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0, -1.0, 1.0), -1.0);
    }
}
