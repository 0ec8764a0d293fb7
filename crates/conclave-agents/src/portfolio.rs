//! Portfolio manager: merges agent reports into one sized decision.

use conclave_analytics::stats::clamp;
use conclave_analytics::AnalyticsError;
use conclave_models::{
    Action, AgentReport, CommitteeConfig, Decision, Domain, DomainWeights, Order,
};
use tracing::debug;

use crate::context::AnalysisContext;
use crate::error::AgentError;

const HOLD_ENTRY_RULE: &str = "Stand aside until composite score crosses a threshold";
const HOLD_NOTES: &str = "Composite score inside thresholds; holding cash";
const NO_TRIGGER: &str = "No technical trigger";

/// Weighted mean of directional scores, clamped to [-1, 1].
///
/// Risk reports carry no direction and are skipped. Non-finite scores count
/// as 0 and a zero total weight yields 0.
pub fn composite_score(reports: &[AgentReport], weights: &DomainWeights) -> f64 {
    let (weighted, total) = reports
        .iter()
        .filter(|r| r.domain.is_directional())
        .fold((0.0, 0.0), |(weighted, total), r| {
            let w = weights.weight_for(r.domain);
            let s = if r.score.is_finite() { r.score } else { 0.0 };
            (weighted + w * s, total + w)
        });

    if total <= 0.0 {
        return 0.0;
    }
    clamp(weighted / total, -1.0, 1.0)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn stance(report: &AgentReport, risk_cap: f64) -> String {
    if report.domain == Domain::Risk {
        let cap = report
            .metadata
            .get("max_weight")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(risk_cap);
        return format!("cap {cap:.2}");
    }
    let label = if report.score > 0.0 {
        "bullish"
    } else if report.score < 0.0 {
        "bearish"
    } else {
        "neutral"
    };
    format!("{label} ({:+.2})", report.score)
}

#[derive(Debug, Clone)]
pub struct PortfolioManager {
    name: String,
}

impl Default for PortfolioManager {
    fn default() -> Self {
        Self {
            name: "Portfolio Manager".to_string(),
        }
    }
}

impl PortfolioManager {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn synthesize(
        &self,
        ctx: &AnalysisContext,
        reports: &[AgentReport],
        risk_cap: f64,
        config: &CommitteeConfig,
    ) -> Result<Decision, AgentError> {
        if reports.is_empty() {
            return Err(AgentError::NoReports);
        }
        let as_of = ctx.as_of().ok_or_else(|| {
            AgentError::Analytics(AnalyticsError::InvalidInput("empty price series".to_string()))
        })?;

        let syn = &config.synthesis;
        let composite = composite_score(reports, &syn.weights);

        let action = if composite == 0.0 {
            Action::Hold
        } else if composite >= syn.buy_threshold {
            Action::Buy
        } else if composite <= syn.sell_threshold {
            Action::Sell
        } else {
            Action::Hold
        };

        let risk_cap = if risk_cap.is_finite() { risk_cap.max(0.0) } else { 0.0 };
        let cap = risk_cap.min(syn.max_gross_exposure).max(0.0);

        let (weight, entry_rule, notes) = match action {
            Action::Hold => (0.0, HOLD_ENTRY_RULE.to_string(), HOLD_NOTES.to_string()),
            Action::Buy | Action::Sell => {
                let weight = round4(composite.abs() * cap).min(cap);
                let triggers: Vec<&str> = reports
                    .iter()
                    .filter(|r| r.domain == Domain::Technical)
                    .flat_map(|r| r.signals.iter().map(String::as_str))
                    .collect();
                let entry_rule = if triggers.is_empty() {
                    NO_TRIGGER.to_string()
                } else {
                    triggers.join(" & ")
                };
                (weight, entry_rule, syn.notes.clone())
            }
        };

        let rationale = reports
            .iter()
            .map(|r| format!("{}: {}", r.agent_name, stance(r, risk_cap)))
            .collect::<Vec<_>>()
            .join("; ");

        debug!(
            symbol = %ctx.symbol,
            composite,
            action = %action,
            weight,
            cap,
            "Synthesized decision"
        );

        Ok(Decision {
            symbol: ctx.symbol.clone(),
            as_of,
            composite_score: composite,
            orders: vec![Order {
                symbol: ctx.symbol.clone(),
                action,
                weight,
                entry_rule,
                stop: syn.stop_loss,
                take_profit: syn.stop_loss * syn.reward_to_risk,
                rationale,
            }],
            max_gross_exposure: syn.max_gross_exposure.min(risk_cap).max(0.0),
            notes,
            agent_reports: reports.to_vec(),
        })
    }
}
