pub mod analyst;
pub mod claude_cli;
pub mod context;
pub mod error;
pub mod fundamental;
pub mod meeting;
pub mod parser;
pub mod portfolio;
pub mod prompts;
pub mod risk;
pub mod sentiment;
pub mod technical;

pub mod test_support;

pub use analyst::Analyst;
pub use context::AnalysisContext;
pub use error::AgentError;
pub use fundamental::FundamentalAnalyst;
pub use meeting::{default_analysts, Meeting, MeetingOutcome};
pub use portfolio::{composite_score, PortfolioManager};
pub use risk::{RiskAssessment, RiskOfficer};
pub use sentiment::{
    ClaudeSentimentScorer, LexiconScorer, SentimentAnalyst, SentimentScore, SentimentScorer,
};
pub use technical::TechnicalAnalyst;
