/// Shape of the JSON object the sentiment scorer must return.
fn response_schema() -> String {
    let example = serde_json::json!({
        "request_id": "<from input>",
        "score": 0.35,
        "rationale": "<one or two sentences naming the headlines that drove the score>"
    });
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

pub fn sentiment_system_prompt() -> String {
    format!(
        "You are the news sentiment analyst on an investment research committee. \
         You score how recent headlines bear on a single stock.\n\n\
         ## DATA FORMAT\n\n\
         The user message is a JSON object:\n\
         - `request_id` → opaque identifier, echo it back\n\
         - `symbol` → the ticker under review\n\
         - `headlines` → array of headline strings\n\n\
         ## SCORING RULES\n\n\
         - Score from -1.0 (strongly bearish) to 1.0 (strongly bullish)\n\
         - 0.0 when headlines are irrelevant to the company or evenly mixed\n\
         - Earnings beats, upgrades, record results and strong guidance push the score up\n\
         - Misses, downgrades, lawsuits, fraud and regulatory risk push the score down\n\
         - Weigh company-specific news above sector or market commentary\n\
         - Do not use any information beyond the headlines provided\n\n\
         ## OUTPUT\n\n\
         Respond ONLY with a JSON object, no other text:\n{}",
        response_schema()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_prompt_contains_schema() {
        let prompt = sentiment_system_prompt();
        assert!(prompt.contains("\"score\""));
        assert!(prompt.contains("\"rationale\""));
        assert!(prompt.contains("\"request_id\""));
    }

    #[test]
    fn sentiment_prompt_contains_score_rules() {
        let prompt = sentiment_system_prompt();
        assert!(prompt.contains("-1.0"));
        assert!(prompt.contains("## DATA FORMAT"));
        assert!(prompt.contains("headlines"));
    }
}
