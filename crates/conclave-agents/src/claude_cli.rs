use std::time::Duration;

use conclave_models::SentimentConfig;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;

/// Model and time budget for one `claude` invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
}

impl From<&SentimentConfig> for ClaudeCliConfig {
    fn from(config: &SentimentConfig) -> Self {
        Self {
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// Run `claude -p` with a system prompt and return its stdout.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, "Invoking claude CLI");

    let output = tokio::time::timeout(
        config.timeout,
        Command::new("claude")
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, stderr = %stderr, "Claude CLI failed");
        return Err(AgentError::Cli(format!(
            "claude exited {}: {stderr}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.trim().is_empty() {
        return Err(AgentError::Cli("Claude returned empty response".to_string()));
    }
    Ok(stdout)
}

/// Whether a working `claude` binary is on PATH.
pub async fn check_cli_available() -> bool {
    Command::new("claude")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}
