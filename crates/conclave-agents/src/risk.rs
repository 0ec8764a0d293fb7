use async_trait::async_trait;
use conclave_analytics::stats::{annualized_volatility, clamp};
use conclave_models::{AgentReport, CommitteeConfig, Domain};

use crate::analyst::Analyst;
use crate::context::AnalysisContext;

/// Result of the risk review: the sizing cap and the report explaining it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    /// Annualized realized volatility over the lookback window.
    pub volatility: f64,
    /// Largest weight the portfolio manager may assign, in [0, max_weight_per_asset].
    pub max_weight: f64,
    pub report: AgentReport,
}

/// Bounds position size by realized volatility. Never directional.
#[derive(Debug, Clone)]
pub struct RiskOfficer {
    name: String,
}

impl Default for RiskOfficer {
    fn default() -> Self {
        Self {
            name: "Risk Officer".to_string(),
        }
    }
}

impl RiskOfficer {
    pub fn assess(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> RiskAssessment {
        let risk = &config.risk;
        let volatility = annualized_volatility(
            &ctx.closes(),
            risk.lookback,
            config.backtest.trading_days_per_year,
        );

        let max_weight = if volatility > 0.0 {
            risk.max_weight_per_asset * (risk.target_volatility / volatility).min(1.0)
        } else {
            risk.max_weight_per_asset
        };

        let penalty = clamp(
            (volatility - risk.target_volatility) / risk.target_volatility,
            0.0,
            1.0,
        );
        let score = clamp(0.5 - penalty, -1.0, 1.0);

        let report = AgentReport {
            agent_name: self.name.clone(),
            domain: Domain::Risk,
            score,
            rationale: format!(
                "Annualized volatility {volatility:.2}; penalty {penalty:.2}; max weight {max_weight:.2}"
            ),
            signals: vec![],
            metadata: serde_json::json!({
                "max_weight": max_weight,
                "volatility": volatility,
                "target_volatility": risk.target_volatility,
                "lookback": risk.lookback,
            }),
        };

        RiskAssessment {
            volatility,
            max_weight,
            report,
        }
    }
}

#[async_trait]
impl Analyst for RiskOfficer {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        Domain::Risk
    }

    async fn analyze(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> AgentReport {
        self.assess(ctx, config).report
    }
}
