use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent_report::Domain;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Top-level configuration for a committee run.
///
/// Every section has defaults, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommitteeConfig {
    pub indicators: IndicatorConfig,
    pub technical: TechnicalConfig,
    pub fundamental: FundamentalConfig,
    pub sentiment: SentimentConfig,
    pub risk: RiskConfig,
    pub synthesis: SynthesisConfig,
    pub backtest: BacktestConfig,
    pub cache: CacheConfig,
}

impl CommitteeConfig {
    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        for (field, period) in [
            ("indicators.sma_fast", ind.sma_fast),
            ("indicators.sma_slow", ind.sma_slow),
            ("indicators.rsi_period", ind.rsi_period),
            ("indicators.macd_fast", ind.macd_fast),
            ("indicators.macd_slow", ind.macd_slow),
            ("indicators.macd_signal", ind.macd_signal),
            ("indicators.bollinger_period", ind.bollinger_period),
        ] {
            if period == 0 {
                return Err(invalid(field, "period must be at least 1"));
            }
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(invalid(
                "indicators.macd_fast",
                "fast period must be shorter than the slow period",
            ));
        }
        if !(ind.bollinger_k.is_finite() && ind.bollinger_k >= 0.0) {
            return Err(invalid("indicators.bollinger_k", "must be a non-negative number"));
        }

        let syn = &self.synthesis;
        if !(syn.buy_threshold > 0.0 && syn.buy_threshold <= 1.0) {
            return Err(invalid("synthesis.buy_threshold", "must be in (0, 1]"));
        }
        if !(syn.sell_threshold < 0.0 && syn.sell_threshold >= -1.0) {
            return Err(invalid("synthesis.sell_threshold", "must be in [-1, 0)"));
        }
        for (field, w) in [
            ("synthesis.weights.technical", syn.weights.technical),
            ("synthesis.weights.fundamental", syn.weights.fundamental),
            ("synthesis.weights.sentiment", syn.weights.sentiment),
        ] {
            if !(w.is_finite() && w >= 0.0) {
                return Err(invalid(field, "weights must be non-negative"));
            }
        }
        if !(syn.stop_loss > 0.0 && syn.reward_to_risk > 0.0) {
            return Err(invalid(
                "synthesis.stop_loss",
                "stop loss and reward-to-risk must be positive",
            ));
        }
        if !(syn.max_gross_exposure >= 0.0) {
            return Err(invalid("synthesis.max_gross_exposure", "must be non-negative"));
        }

        if !(self.risk.target_volatility > 0.0) {
            return Err(invalid("risk.target_volatility", "must be positive"));
        }
        if !(self.risk.max_weight_per_asset >= 0.0) {
            return Err(invalid("risk.max_weight_per_asset", "must be non-negative"));
        }
        if self.risk.lookback < 2 {
            return Err(invalid("risk.lookback", "need at least two returns"));
        }

        if !(self.backtest.trading_days_per_year > 0.0) {
            return Err(invalid("backtest.trading_days_per_year", "must be positive"));
        }
        if self.backtest.horizon_bars == Some(0) {
            return Err(invalid("backtest.horizon_bars", "must be at least 1 when set"));
        }
        // A forward replay starts at as_of, which is the last bar the agents saw.
        if self.backtest.window == BacktestWindow::Forward
            && self.backtest.holdout_bars < BacktestConfig::MIN_BARS_AFTER_START
        {
            return Err(invalid(
                "backtest.holdout_bars",
                format!(
                    "a forward window needs at least {} held-out bars",
                    BacktestConfig::MIN_BARS_AFTER_START
                ),
            ));
        }

        if self.sentiment.timeout_seconds == 0 {
            return Err(invalid("sentiment.timeout_seconds", "must be at least 1"));
        }
        if self.sentiment.max_headlines == 0 {
            return Err(invalid("sentiment.max_headlines", "must be at least 1"));
        }
        Ok(())
    }
}

/// Lookback periods for the indicator engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    /// Band width in standard deviations.
    pub bollinger_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_slow: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
        }
    }
}

impl IndicatorConfig {
    /// Bars needed before the MACD signal line has a value on the last bar.
    pub fn min_history(&self) -> usize {
        self.macd_slow + self.macd_signal
    }
}

/// Signal weights for the technical analyst.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TechnicalConfig {
    pub trend_weight: f64,
    pub macd_weight: f64,
    pub rsi_weight: f64,
    pub band_weight: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            trend_weight: 0.4,
            macd_weight: 0.3,
            rsi_weight: 0.2,
            band_weight: 0.1,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

/// Reference thresholds for the fundamental analyst.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FundamentalConfig {
    /// P/E strictly between 0 and this is attractive.
    pub pe_attractive_below: f64,
    /// P/E at or above this is elevated.
    pub pe_elevated_at: f64,
    pub pb_reasonable_below: f64,
    pub pb_high_above: f64,
    /// Debt-to-assets below this counts as manageable leverage.
    pub max_debt_to_asset: f64,
    /// ESG score that contributes nothing either way.
    pub esg_neutral: f64,
}

impl Default for FundamentalConfig {
    fn default() -> Self {
        Self {
            pe_attractive_below: 25.0,
            pe_elevated_at: 40.0,
            pb_reasonable_below: 4.0,
            pb_high_above: 8.0,
            max_debt_to_asset: 0.6,
            esg_neutral: 50.0,
        }
    }
}

/// Which sentiment scorer backs the sentiment analyst.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Lexicon,
    Claude,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SentimentConfig {
    pub scorer: ScorerKind,
    /// Model passed to the `claude` CLI when `scorer = "claude"`.
    pub model: String,
    /// Upper bound on a single scorer call before falling back to neutral.
    pub timeout_seconds: u64,
    /// Headlines beyond this many are ignored.
    pub max_headlines: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::Lexicon,
            model: "claude-3-5-haiku-latest".to_string(),
            timeout_seconds: 30,
            max_headlines: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Trailing daily returns used for realized volatility.
    pub lookback: usize,
    /// Annualized volatility at which the full per-asset weight is allowed.
    pub target_volatility: f64,
    pub max_weight_per_asset: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            target_volatility: 0.3,
            max_weight_per_asset: 0.2,
        }
    }
}

/// Relative weight of each directional domain in the composite score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomainWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
}

impl Default for DomainWeights {
    fn default() -> Self {
        Self {
            technical: 1.0,
            fundamental: 1.0,
            sentiment: 1.0,
        }
    }
}

impl DomainWeights {
    pub fn weight_for(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Technical => self.technical,
            Domain::Fundamental => self.fundamental,
            Domain::Sentiment => self.sentiment,
            Domain::Risk => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub weights: DomainWeights,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    /// Fractional stop-loss distance.
    pub stop_loss: f64,
    /// Take-profit as a multiple of the stop distance.
    pub reward_to_risk: f64,
    pub max_gross_exposure: f64,
    /// Free-text portfolio guidance attached to actionable decisions.
    pub notes: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            weights: DomainWeights::default(),
            buy_threshold: 0.15,
            sell_threshold: -0.15,
            stop_loss: 0.08,
            reward_to_risk: 2.5,
            max_gross_exposure: 1.0,
            notes: "Diversify across sectors; keep single-sector exposure below 50%".to_string(),
        }
    }
}

/// Where the backtest replay starts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BacktestWindow {
    /// Replay over the whole supplied history.
    #[default]
    InSample,
    /// Replay from the decision's `as_of` bar forward.
    Forward,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BacktestConfig {
    pub window: BacktestWindow,
    /// Maximum number of daily returns to simulate.
    pub horizon_bars: Option<usize>,
    pub trading_days_per_year: f64,
    /// Bars withheld from analysis and only used by a forward backtest.
    pub holdout_bars: usize,
}

impl BacktestConfig {
    /// Bars that must follow the start bar for a replay to be meaningful.
    pub const MIN_BARS_AFTER_START: usize = 2;
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            window: BacktestWindow::InSample,
            horizon_bars: None,
            trading_days_per_year: 252.0,
            holdout_bars: 0,
        }
    }
}

/// Configuration for the market-data cache reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the shared SQLite cache file (written by a data pipeline, read here).
    pub sqlite_path: String,
    /// Maximum number of entries in the in-memory moka cache.
    pub memory_max_capacity: u64,
    /// How long a read stays in memory, in seconds.
    pub memory_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/conclave_cache.db".to_string(),
            memory_max_capacity: 10_000,
            memory_ttl_seconds: 60,
        }
    }
}
