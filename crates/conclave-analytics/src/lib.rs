pub mod backtest;
pub mod error;
pub mod indicators;
pub mod stats;

pub use backtest::evaluate;
pub use error::AnalyticsError;
pub use indicators::{compute, validate_series, IndicatorSet};
