use async_trait::async_trait;
use conclave_analytics::stats::clamp;
use conclave_models::{AgentReport, CommitteeConfig, Domain};

use crate::analyst::Analyst;
use crate::context::AnalysisContext;

const PE_ATTRACTIVE: f64 = 0.25;
const PE_ELEVATED: f64 = -0.15;
const PB_REASONABLE: f64 = 0.10;
const PB_HIGH: f64 = -0.10;
const MAX_DIVIDEND_BONUS: f64 = 0.10;
const LEVERAGE: f64 = 0.15;

/// Valuation, income, leverage and ESG screen over point-in-time metrics.
#[derive(Debug, Clone)]
pub struct FundamentalAnalyst {
    name: String,
}

impl Default for FundamentalAnalyst {
    fn default() -> Self {
        Self {
            name: "Fundamental Analyst".to_string(),
        }
    }
}

#[async_trait]
impl Analyst for FundamentalAnalyst {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        Domain::Fundamental
    }

    async fn analyze(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> AgentReport {
        let cfg = &config.fundamental;
        let metric = |key: &str| ctx.fundamentals.get(key).copied().filter(|v| v.is_finite());

        let mut score = 0.0;
        let mut signals = Vec::new();

        if let Some(pe) = metric("pe_ratio") {
            if pe > 0.0 && pe < cfg.pe_attractive_below {
                score += PE_ATTRACTIVE;
                signals.push(format!("PE attractive at {pe:.1}"));
            } else if pe >= cfg.pe_elevated_at {
                score += PE_ELEVATED;
                signals.push(format!("PE elevated at {pe:.1}"));
            }
        }

        if let Some(pb) = metric("pb_ratio") {
            if pb < cfg.pb_reasonable_below {
                score += PB_REASONABLE;
                signals.push(format!("PB reasonable at {pb:.1}"));
            } else if pb > cfg.pb_high_above {
                score += PB_HIGH;
                signals.push(format!("PB high at {pb:.1}"));
            }
        }

        if let Some(dy) = metric("dividend_yield") {
            score += (dy * 5.0).min(MAX_DIVIDEND_BONUS);
            signals.push(format!("Dividend yield {:.2}%", dy * 100.0));
        }

        if let Some(leverage) = metric("debt_to_asset") {
            if leverage < cfg.max_debt_to_asset {
                score += LEVERAGE;
                signals.push(format!("Leverage manageable ({leverage:.2})"));
            } else {
                score -= LEVERAGE;
                signals.push(format!("Leverage high ({leverage:.2})"));
            }
        }

        if let Some(esg) = metric("esg_score") {
            score += clamp((esg - cfg.esg_neutral) / 200.0, -0.05, 0.10);
            signals.push(format!("ESG score {esg:.1}"));
        }

        let rationale = if signals.is_empty() {
            "Limited fundamentals available".to_string()
        } else {
            signals.join("; ")
        };

        AgentReport {
            agent_name: self.name.clone(),
            domain: Domain::Fundamental,
            score: clamp(score, -1.0, 1.0),
            rationale,
            signals,
            metadata: serde_json::to_value(&ctx.fundamentals).unwrap_or_default(),
        }
    }
}
