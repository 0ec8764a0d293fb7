pub mod agent_report;
pub mod cache_schema;
pub mod config;
pub mod decision;
pub mod market;

pub use agent_report::{AgentReport, Domain};
pub use cache_schema::{CacheCategory, CacheRow};
pub use config::{
    BacktestConfig, BacktestWindow, CacheConfig, CommitteeConfig, ConfigError, DomainWeights,
    FundamentalConfig, IndicatorConfig, RiskConfig, ScorerKind, SentimentConfig, SynthesisConfig,
    TechnicalConfig,
};
pub use decision::{Action, BacktestMetrics, Decision, DecisionReport, Order};
pub use market::{DateRange, MarketSnapshot, PriceBar};
