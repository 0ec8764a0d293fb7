use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Agent response parse error: {0}")]
    Parse(String),

    #[error("Agent timed out after {0} seconds")]
    Timeout(u64),

    #[error("No agent reports to synthesize")]
    NoReports,

    #[error("Analytics error: {0}")]
    Analytics(#[from] conclave_analytics::AnalyticsError),

    #[error("Cache error: {0}")]
    Cache(#[from] conclave_cache::CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
