//! Integration tests that invoke the real Claude CLI.
//!
//! These tests are `#[ignore]` by default. They need the `claude` CLI on PATH
//! with working credentials. Run explicitly with:
//! ```bash
//! cargo test -p conclave-agents --test cli_integration -- --ignored
//! ```

use std::time::Duration;

use conclave_agents::claude_cli::{check_cli_available, invoke_claude, ClaudeCliConfig};
use conclave_agents::parser::extract_json;
use conclave_agents::{ClaudeSentimentScorer, SentimentScorer};
use conclave_models::SentimentConfig;

#[tokio::test]
#[ignore]
async fn cli_is_available() {
    assert!(check_cli_available().await, "claude CLI not found on PATH");
}

/// Catches changes in the CLI's output wrapping that would break JSON extraction.
#[tokio::test]
#[ignore]
async fn cli_output_is_parseable_json() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let config = ClaudeCliConfig {
        model: "claude-3-5-haiku-latest".to_string(),
        timeout: Duration::from_secs(30),
    };
    let system_prompt = "Respond ONLY with a JSON object of the form {\"status\": \"ok\"}.";

    let raw = invoke_claude(system_prompt, "ping", &config)
        .await
        .expect("Claude CLI invocation failed");
    let json = extract_json(&raw)
        .unwrap_or_else(|e| panic!("no JSON in CLI output ({e}):\n---\n{raw}\n---"));
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["status"], "ok", "unexpected response: {parsed}");
}

#[tokio::test]
#[ignore]
async fn claude_scorer_scores_obvious_headlines() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let headlines = vec![
        "Acme Corp beats earnings estimates and raises full-year guidance".to_string(),
        "Analysts upgrade Acme Corp to strong buy".to_string(),
    ];
    let verdict = ClaudeSentimentScorer
        .score("ACME", &headlines, &SentimentConfig::default())
        .await
        .expect("Claude sentiment scoring failed");

    assert!(verdict.score > 0.0, "expected bullish score, got {verdict:?}");
    assert!((-1.0..=1.0).contains(&verdict.score));
}

#[tokio::test]
#[ignore]
async fn cli_reports_errors_for_invalid_model() {
    if !check_cli_available().await {
        eprintln!("Skipping: claude CLI not available");
        return;
    }

    let config = ClaudeCliConfig {
        model: "nonexistent-model-12345".to_string(),
        timeout: Duration::from_secs(15),
    };
    let result = invoke_claude("You are a test.", "hello", &config).await;
    assert!(result.is_err(), "expected error for invalid model");
}
