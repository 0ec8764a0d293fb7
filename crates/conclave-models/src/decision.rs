use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::agent_report::AgentReport;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// +1 long, -1 short, 0 flat.
    pub fn direction(self) -> f64 {
        match self {
            Action::Buy => 1.0,
            Action::Sell => -1.0,
            Action::Hold => 0.0,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// A sized order proposed by the portfolio manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub symbol: String,
    pub action: Action,
    /// Fraction of capital, 0.0 up to the decision's `max_gross_exposure`.
    pub weight: f64,
    pub entry_rule: String,
    /// Fractional stop-loss distance (0.08 = 8%).
    pub stop: f64,
    /// Fractional profit target.
    pub take_profit: f64,
    pub rationale: String,
}

/// The committee's decision for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub symbol: String,
    /// Date of the last bar used for analysis.
    pub as_of: NaiveDate,
    pub composite_score: f64,
    pub orders: Vec<Order>,
    pub max_gross_exposure: f64,
    pub notes: String,
    pub agent_reports: Vec<AgentReport>,
}

impl Decision {
    /// Action of the first order, `Hold` when there is none.
    pub fn action(&self) -> Action {
        self.orders.first().map_or(Action::Hold, |o| o.action)
    }

    /// Weight of the first order, 0 when there is none.
    pub fn weight(&self) -> f64 {
        self.orders.first().map_or(0.0, |o| o.weight)
    }
}

/// Retrospective performance of a decision's directional thesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestMetrics {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction, e.g. -0.12 for a 12% peak-to-trough decline.
    pub max_drawdown: f64,
    pub annualized_return: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of simulated daily returns.
    pub periods: usize,
}

/// Output record: the decision with its backtest attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionReport {
    #[serde(flatten)]
    pub decision: Decision,
    pub backtest: BacktestMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_report::Domain;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample_decision() -> Decision {
        Decision {
            symbol: "AAPL".to_string(),
            as_of: date(28),
            composite_score: 0.42,
            orders: vec![Order {
                symbol: "AAPL".to_string(),
                action: Action::Buy,
                weight: 0.084,
                entry_rule: "SMA20 above SMA50 & MACD histogram positive".to_string(),
                stop: 0.08,
                take_profit: 0.2,
                rationale: "Technical Analyst: bullish (+0.70)".to_string(),
            }],
            max_gross_exposure: 0.2,
            notes: "Diversify across sectors".to_string(),
            agent_reports: vec![AgentReport {
                agent_name: "Technical Analyst".to_string(),
                domain: Domain::Technical,
                score: 0.7,
                rationale: "SMA20 above SMA50".to_string(),
                signals: vec!["SMA20 above SMA50".to_string()],
                metadata: serde_json::json!({"close": 187.5}),
            }],
        }
    }

    #[test]
    fn action_serialization() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Action::Sell).unwrap(), "\"sell\"");
        assert_eq!(serde_json::to_string(&Action::Hold).unwrap(), "\"hold\"");
    }

    #[test]
    fn direction_signs() {
        assert_eq!(Action::Buy.direction(), 1.0);
        assert_eq!(Action::Sell.direction(), -1.0);
        assert_eq!(Action::Hold.direction(), 0.0);
    }

    #[test]
    fn decision_without_orders_is_hold() {
        let mut decision = sample_decision();
        decision.orders.clear();
        assert_eq!(decision.action(), Action::Hold);
        assert_eq!(decision.weight(), 0.0);
    }

    #[test]
    fn report_flattens_decision_fields() {
        let report = DecisionReport {
            decision: sample_decision(),
            backtest: BacktestMetrics {
                total_return: 0.05,
                sharpe_ratio: 1.2,
                max_drawdown: -0.03,
                annualized_return: 0.21,
                start: date(1),
                end: date(28),
                periods: 19,
            },
        };

        let value = serde_json::to_value(&report).unwrap();
        for field in [
            "symbol",
            "as_of",
            "composite_score",
            "orders",
            "max_gross_exposure",
            "notes",
            "agent_reports",
            "backtest",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["as_of"], "2024-03-28");
        assert_eq!(value["orders"][0]["action"], "buy");
        assert_eq!(value["backtest"]["max_drawdown"], -0.03);

        let parsed: DecisionReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, report);
    }
}
