use serde::{Deserialize, Serialize};

/// The angle an agent analyzes an instrument from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Technical,
    Fundamental,
    Sentiment,
    Risk,
}

impl Domain {
    /// Directional domains feed the composite score; risk only bounds sizing.
    pub fn is_directional(self) -> bool {
        !matches!(self, Domain::Risk)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Technical => "technical",
            Domain::Fundamental => "fundamental",
            Domain::Sentiment => "sentiment",
            Domain::Risk => "risk",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent's opinion on one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentReport {
    pub agent_name: String,
    pub domain: Domain,
    /// -1.0 (strongly bearish) to 1.0 (strongly bullish).
    pub score: f64,
    pub rationale: String,
    /// Conditions that fired while scoring, in evaluation order.
    #[serde(default)]
    pub signals: Vec<String>,
    /// Agent-specific structured detail.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AgentReport {
    /// A zero-score report explaining why the agent had nothing to say.
    pub fn neutral(agent_name: &str, domain: Domain, rationale: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            domain,
            score: 0.0,
            rationale: rationale.into(),
            signals: vec![],
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
