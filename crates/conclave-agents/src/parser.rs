use serde::Deserialize;

use crate::error::AgentError;
use crate::sentiment::SentimentScore;

/// Pull the first JSON object out of free-form model output.
///
/// Tried in order: the whole text, a fenced code block, then the first
/// balanced `{ ... }` outside string literals.
pub fn extract_json(text: &str) -> Result<String, AgentError> {
    let trimmed = text.trim();

    let candidates = [
        trimmed.starts_with('{').then(|| trimmed.to_string()),
        fenced_block(trimmed),
        first_balanced_object(trimmed),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
        .ok_or_else(|| {
            AgentError::Parse(format!(
                "No valid JSON object found in response (length={})",
                text.len()
            ))
        })
}

/// Body of the first ```json or bare ``` fence.
fn fenced_block(text: &str) -> Option<String> {
    const OPENERS: [&str; 4] = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    OPENERS.iter().find_map(|opener| {
        let body_start = text.find(opener)? + opener.len();
        let body_len = text[body_start..].find("```")?;
        Some(text[body_start..body_start + body_len].trim().to_string())
    })
}

fn first_balanced_object(text: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| text[s..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawSentiment {
    score: f64,
    #[serde(default)]
    rationale: String,
}

/// Parse a `{score, rationale}` object from raw scorer output.
pub fn parse_sentiment_response(raw: &str) -> Result<SentimentScore, AgentError> {
    let json = extract_json(raw)?;
    let parsed: RawSentiment = serde_json::from_str(&json)
        .map_err(|e| AgentError::Parse(format!("Failed to parse sentiment: {e}\nJSON: {json}")))?;
    Ok(SentimentScore {
        score: parsed.score,
        rationale: parsed.rationale,
    })
}
