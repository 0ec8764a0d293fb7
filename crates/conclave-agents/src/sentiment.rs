use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conclave_analytics::stats::{clamp, mean};
use conclave_models::{AgentReport, CommitteeConfig, Domain, SentimentConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::analyst::Analyst;
use crate::claude_cli::{invoke_claude, ClaudeCliConfig};
use crate::context::AnalysisContext;
use crate::error::AgentError;
use crate::parser::parse_sentiment_response;
use crate::prompts::sentiment_system_prompt;

const POSITIVE_KEYWORDS: [&str; 8] = [
    "beats",
    "growth",
    "surge",
    "outperform",
    "bullish",
    "upgrade",
    "strong",
    "record",
];

const NEGATIVE_KEYWORDS: [&str; 9] = [
    "miss",
    "decline",
    "drop",
    "lawsuit",
    "bearish",
    "downgrade",
    "weak",
    "fraud",
    "risk",
];

/// A scorer's verdict on a batch of headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// -1.0 to 1.0.
    pub score: f64,
    pub rationale: String,
}

/// Turns headlines into a sentiment score. Mockable for testing.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(
        &self,
        symbol: &str,
        headlines: &[String],
        config: &SentimentConfig,
    ) -> Result<SentimentScore, AgentError>;
}

/// Keyword lexicon: per-headline `(pos - neg) / (pos + neg)`, averaged, then `tanh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn score_headline(headline: &str) -> f64 {
        let (mut pos, mut neg) = (0u32, 0u32);
        for token in headline.split_whitespace() {
            let word = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if POSITIVE_KEYWORDS.contains(&word.as_str()) {
                pos += 1;
            } else if NEGATIVE_KEYWORDS.contains(&word.as_str()) {
                neg += 1;
            }
        }
        if pos + neg == 0 {
            return 0.0;
        }
        (f64::from(pos) - f64::from(neg)) / f64::from(pos + neg)
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn score(
        &self,
        _symbol: &str,
        headlines: &[String],
        _config: &SentimentConfig,
    ) -> Result<SentimentScore, AgentError> {
        let scores: Vec<f64> = headlines
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| Self::score_headline(h))
            .collect();

        let Some(avg) = mean(&scores) else {
            return Ok(SentimentScore {
                score: 0.0,
                rationale: "No recent news".to_string(),
            });
        };

        let score = avg.tanh();
        Ok(SentimentScore {
            score,
            rationale: format!(
                "Average sentiment score {score:.2} based on {} headlines",
                scores.len()
            ),
        })
    }
}

/// Asks the `claude` CLI to score the headlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeSentimentScorer;

#[async_trait]
impl SentimentScorer for ClaudeSentimentScorer {
    fn name(&self) -> &str {
        "claude"
    }

    async fn score(
        &self,
        symbol: &str,
        headlines: &[String],
        config: &SentimentConfig,
    ) -> Result<SentimentScore, AgentError> {
        let request = serde_json::json!({
            "request_id": Uuid::new_v4(),
            "symbol": symbol,
            "headlines": headlines,
        });
        let user_prompt = serde_json::to_string(&request)?;
        let raw = invoke_claude(
            &sentiment_system_prompt(),
            &user_prompt,
            &ClaudeCliConfig::from(config),
        )
        .await?;
        parse_sentiment_response(&raw)
    }
}

/// Scores recent news through an injected [`SentimentScorer`].
///
/// The scorer runs under `sentiment.timeout_seconds`; a timeout or scorer
/// error produces a neutral report instead of failing the meeting.
pub struct SentimentAnalyst {
    name: String,
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentAnalyst {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            name: "Sentiment Analyst".to_string(),
            scorer,
        }
    }

    fn unavailable(&self, reason: impl std::fmt::Display, headlines: usize) -> AgentReport {
        AgentReport::neutral(
            &self.name,
            Domain::Sentiment,
            format!("Sentiment scorer unavailable: {reason}"),
        )
        .with_metadata(serde_json::json!({
            "headline_count": headlines,
            "scorer": self.scorer.name(),
        }))
    }
}

impl Default for SentimentAnalyst {
    fn default() -> Self {
        Self::new(Arc::new(LexiconScorer))
    }
}

#[async_trait]
impl Analyst for SentimentAnalyst {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        Domain::Sentiment
    }

    async fn analyze(&self, ctx: &AnalysisContext, config: &CommitteeConfig) -> AgentReport {
        let headlines: Vec<String> = ctx
            .news
            .iter()
            .filter(|h| !h.trim().is_empty())
            .take(config.sentiment.max_headlines)
            .cloned()
            .collect();

        if headlines.is_empty() {
            return AgentReport::neutral(&self.name, Domain::Sentiment, "No recent news")
                .with_metadata(serde_json::json!({ "headline_count": 0 }));
        }

        let budget = Duration::from_secs(config.sentiment.timeout_seconds);
        let call = self.scorer.score(&ctx.symbol, &headlines, &config.sentiment);

        let verdict = match tokio::time::timeout(budget, call).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(symbol = %ctx.symbol, scorer = self.scorer.name(), error = %e, "Sentiment scorer failed");
                return self.unavailable(e, headlines.len());
            }
            Err(_) => {
                warn!(
                    symbol = %ctx.symbol,
                    scorer = self.scorer.name(),
                    timeout_secs = budget.as_secs(),
                    "Sentiment scorer timed out"
                );
                return self.unavailable(
                    format!("timed out after {} seconds", budget.as_secs()),
                    headlines.len(),
                );
            }
        };

        let score = if verdict.score.is_finite() {
            clamp(verdict.score, -1.0, 1.0)
        } else {
            0.0
        };

        AgentReport {
            agent_name: self.name.clone(),
            domain: Domain::Sentiment,
            score,
            rationale: verdict.rationale,
            signals: vec![],
            metadata: serde_json::json!({
                "headline_count": headlines.len(),
                "scorer": self.scorer.name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_from_bars, rising_bars, ScriptedScorer};
    use approx::assert_relative_eq;

    fn context_with_news(news: &[&str]) -> AnalysisContext {
        let mut ctx = context_from_bars("AAPL", rising_bars(40));
        ctx.news = news.iter().map(|s| s.to_string()).collect();
        ctx
    }

    #[test]
    fn headline_scoring() {
        assert_eq!(LexiconScorer::score_headline("Apple beats estimates"), 1.0);
        assert_eq!(LexiconScorer::score_headline("Analysts downgrade on weak demand"), -1.0);
        assert_eq!(LexiconScorer::score_headline("Strong quarter despite lawsuit"), 0.0);
        assert_eq!(LexiconScorer::score_headline("Company holds annual meeting"), 0.0);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(LexiconScorer::score_headline("RECORD revenue, BULLISH outlook!"), 1.0);
        assert_eq!(LexiconScorer::score_headline("\"Fraud\" probe widens."), -1.0);
    }

    #[tokio::test]
    async fn lexicon_averages_then_squashes() {
        let headlines = vec![
            "Apple beats estimates".to_string(),
            "Quiet day on the market".to_string(),
        ];
        let verdict = LexiconScorer
            .score("AAPL", &headlines, &SentimentConfig::default())
            .await
            .unwrap();
        assert_relative_eq!(verdict.score, 0.5f64.tanh(), epsilon = 1e-12);
        assert!(verdict.rationale.contains("2 headlines"));
    }

    #[tokio::test]
    async fn no_news_is_neutral() {
        let report = SentimentAnalyst::default()
            .analyze(&context_with_news(&[]), &CommitteeConfig::default())
            .await;
        assert_eq!(report.score, 0.0);
        assert_eq!(report.rationale, "No recent news");
    }

    #[tokio::test]
    async fn blank_headlines_count_as_no_news() {
        let report = SentimentAnalyst::default()
            .analyze(&context_with_news(&["   ", ""]), &CommitteeConfig::default())
            .await;
        assert_eq!(report.rationale, "No recent news");
    }

    #[tokio::test]
    async fn positive_news_scores_positive() {
        let report = SentimentAnalyst::default()
            .analyze(
                &context_with_news(&["Apple beats estimates", "Analysts upgrade Apple"]),
                &CommitteeConfig::default(),
            )
            .await;
        assert_relative_eq!(report.score, 1.0f64.tanh(), epsilon = 1e-12);
        assert_eq!(report.metadata["scorer"], "lexicon");
    }

    #[tokio::test]
    async fn headline_cap_is_applied() {
        let mut config = CommitteeConfig::default();
        config.sentiment.max_headlines = 1;
        let report = SentimentAnalyst::default()
            .analyze(
                &context_with_news(&["Apple beats estimates", "Fraud lawsuit filed"]),
                &config,
            )
            .await;
        assert_eq!(report.metadata["headline_count"], 1);
        assert!(report.score > 0.0);
    }

    #[tokio::test]
    async fn failing_scorer_falls_back_to_neutral() {
        let analyst = SentimentAnalyst::new(Arc::new(ScriptedScorer::failing()));
        let report = analyst
            .analyze(&context_with_news(&["Apple beats estimates"]), &CommitteeConfig::default())
            .await;
        assert_eq!(report.score, 0.0);
        assert!(report.rationale.starts_with("Sentiment scorer unavailable"));
    }

    #[tokio::test]
    async fn slow_scorer_times_out_to_neutral() {
        let mut config = CommitteeConfig::default();
        config.sentiment.timeout_seconds = 1;
        let analyst = SentimentAnalyst::new(Arc::new(ScriptedScorer::slow(
            0.9,
            Duration::from_secs(10),
        )));
        let report = analyst
            .analyze(&context_with_news(&["Apple beats estimates"]), &config)
            .await;
        assert_eq!(report.score, 0.0);
        assert!(report.rationale.starts_with("Sentiment scorer unavailable"));
        assert!(report.rationale.contains("timed out"));
    }

    #[tokio::test]
    async fn scorer_output_is_clamped() {
        let analyst = SentimentAnalyst::new(Arc::new(ScriptedScorer::fixed(3.0)));
        let report = analyst
            .analyze(&context_with_news(&["anything"]), &CommitteeConfig::default())
            .await;
        assert_eq!(report.score, 1.0);

        let analyst = SentimentAnalyst::new(Arc::new(ScriptedScorer::fixed(f64::NAN)));
        let report = analyst
            .analyze(&context_with_news(&["anything"]), &CommitteeConfig::default())
            .await;
        assert_eq!(report.score, 0.0);
    }
}
