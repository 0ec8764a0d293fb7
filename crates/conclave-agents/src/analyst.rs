use async_trait::async_trait;
use conclave_models::{AgentReport, CommitteeConfig, Domain};

use crate::context::AnalysisContext;

/// One seat at the committee table. Mockable for testing.
///
/// Analysts never fail: missing data or an unavailable collaborator yields a
/// neutral report whose rationale says why.
#[async_trait]
pub trait Analyst: Send + Sync {
    fn name(&self) -> &str;
    fn domain(&self) -> Domain;

    async fn analyze(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> AgentReport;
}
