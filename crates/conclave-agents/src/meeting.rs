use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use conclave_analytics::backtest::evaluate;
use conclave_cache::MarketDataSource;
use conclave_models::{AgentReport, CommitteeConfig, DateRange, DecisionReport, Domain, MarketSnapshot};
use tracing::{error, info, warn};

use crate::analyst::Analyst;
use crate::context::AnalysisContext;
use crate::error::AgentError;
use crate::fundamental::FundamentalAnalyst;
use crate::portfolio::PortfolioManager;
use crate::risk::RiskOfficer;
use crate::sentiment::{SentimentAnalyst, SentimentScorer};
use crate::technical::TechnicalAnalyst;

/// Per-symbol results of one committee run.
#[derive(Debug, Clone, Default)]
pub struct MeetingOutcome {
    pub decisions: BTreeMap<String, DecisionReport>,
    /// Symbol → error text for symbols that produced no decision.
    pub failures: BTreeMap<String, String>,
}

/// Technical, fundamental and sentiment analysts, in report order.
pub fn default_analysts(scorer: Arc<dyn SentimentScorer>) -> Vec<Arc<dyn Analyst>> {
    vec![
        Arc::new(TechnicalAnalyst::default()),
        Arc::new(FundamentalAnalyst::default()),
        Arc::new(SentimentAnalyst::new(scorer)),
    ]
}

/// Runs the committee: load, analyze, synthesize and backtest each symbol.
///
/// Symbols run as independent tasks; one symbol's failure is recorded and
/// never aborts the others.
#[derive(Clone)]
pub struct Meeting {
    source: Arc<dyn MarketDataSource>,
    analysts: Vec<Arc<dyn Analyst>>,
    risk_officer: Arc<RiskOfficer>,
    portfolio_manager: Arc<PortfolioManager>,
    config: Arc<CommitteeConfig>,
}

impl Meeting {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        analysts: Vec<Arc<dyn Analyst>>,
        risk_officer: RiskOfficer,
        config: CommitteeConfig,
    ) -> Self {
        Self {
            source,
            analysts,
            risk_officer: Arc::new(risk_officer),
            portfolio_manager: Arc::new(PortfolioManager::default()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CommitteeConfig {
        &self.config
    }

    pub async fn run(&self, symbols: &[String], range: DateRange) -> MeetingOutcome {
        let start = Instant::now();
        let unique: BTreeSet<&String> = symbols.iter().collect();
        info!(symbols = unique.len(), "Committee meeting started");

        let handles: Vec<_> = unique
            .into_iter()
            .map(|symbol| {
                let meeting = self.clone();
                let symbol = symbol.clone();
                let handle = tokio::spawn({
                    let symbol = symbol.clone();
                    async move { meeting.evaluate_symbol(&symbol, &range).await }
                });
                (symbol, handle)
            })
            .collect();

        let mut outcome = MeetingOutcome::default();
        for (symbol, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => {
                    outcome.decisions.insert(symbol, report);
                }
                Ok(Err(e)) => {
                    warn!(symbol = %symbol, error = %e, "Symbol failed");
                    outcome.failures.insert(symbol, e.to_string());
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Symbol task panicked");
                    outcome.failures.insert(symbol, format!("task failed: {e}"));
                }
            }
        }

        info!(
            decided = outcome.decisions.len(),
            failed = outcome.failures.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Committee meeting finished"
        );
        outcome
    }

    async fn evaluate_symbol(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<DecisionReport, AgentError> {
        let snapshot = self.source.load(symbol, range).await?;
        self.analyze_symbol(snapshot).await
    }

    /// Run the full pipeline for an already-loaded snapshot.
    pub async fn analyze_symbol(&self, snapshot: MarketSnapshot) -> Result<DecisionReport, AgentError> {
        let start = Instant::now();
        let symbol = snapshot.symbol.clone();
        info!(symbol = %symbol, bars = snapshot.bars.len(), "Starting evaluation");

        // The holdout tail is hidden from the agents but replayed by the backtest.
        let replay_bars = snapshot.bars.clone();
        let mut visible = snapshot;
        let keep = visible
            .bars
            .len()
            .saturating_sub(self.config.backtest.holdout_bars);
        visible.bars.truncate(keep);

        let ctx = Arc::new(AnalysisContext::build(visible, &self.config.indicators)?);

        let handles: Vec<_> = self
            .analysts
            .iter()
            .map(|analyst| {
                let analyst = Arc::clone(analyst);
                let ctx = Arc::clone(&ctx);
                let config = Arc::clone(&self.config);
                tokio::spawn(async move {
                    let agent_start = Instant::now();
                    let report = analyst.analyze(&ctx, &config).await;
                    (report, agent_start.elapsed())
                })
            })
            .collect();

        let risk_handle = {
            let officer = Arc::clone(&self.risk_officer);
            let ctx = Arc::clone(&ctx);
            let config = Arc::clone(&self.config);
            tokio::spawn(async move { officer.assess(&ctx, &config) })
        };

        let mut reports: Vec<AgentReport> = Vec::with_capacity(self.analysts.len() + 1);
        for (analyst, handle) in self.analysts.iter().zip(handles) {
            match handle.await {
                Ok((report, elapsed)) => {
                    info!(
                        symbol = %symbol,
                        agent = %report.agent_name,
                        score = report.score,
                        elapsed_ms = elapsed.as_millis(),
                        "Agent reported"
                    );
                    reports.push(report);
                }
                Err(e) => {
                    warn!(symbol = %symbol, agent = analyst.name(), error = %e, "Agent failed");
                    reports.push(AgentReport::neutral(
                        analyst.name(),
                        analyst.domain(),
                        format!("Agent failed: {e}"),
                    ));
                }
            }
        }

        let risk_cap = match risk_handle.await {
            Ok(assessment) => {
                reports.push(assessment.report);
                assessment.max_weight
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Risk assessment failed; allowing no exposure");
                reports.push(AgentReport::neutral(
                    self.risk_officer.name(),
                    Domain::Risk,
                    format!("Risk assessment failed: {e}"),
                ));
                0.0
            }
        };

        let decision = self
            .portfolio_manager
            .synthesize(&ctx, &reports, risk_cap, &self.config)?;
        let backtest = evaluate(&decision, &replay_bars, &self.config.backtest)?;

        info!(
            symbol = %symbol,
            composite = decision.composite_score,
            action = %decision.action(),
            weight = decision.weight(),
            total_return = backtest.total_return,
            elapsed_ms = start.elapsed().as_millis(),
            "Evaluation complete"
        );

        Ok(DecisionReport { decision, backtest })
    }
}
