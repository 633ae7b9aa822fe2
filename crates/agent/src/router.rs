use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm::LlmClient;
use crate::prompts::ROUTER_SYSTEM_PROMPT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MarketAnalysis,
    Recommendation,
    Emissions,
    Theory,
    Insights,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketAnalysis => "market_analysis",
            Self::Recommendation => "recommendation",
            Self::Emissions => "emissions",
            Self::Theory => "theory",
            Self::Insights => "insights",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword groups checked in order; the first group with a hit wins.
const KEYWORD_RULES: &[(Intent, &[&str])] = &[
    (Intent::MarketAnalysis, &["price", "demand", "selling", "market"]),
    (Intent::Recommendation, &["recommend", "buy", "best option", "suggest"]),
    (Intent::Emissions, &["emission", "offset", "co2", "impact"]),
    (Intent::Theory, &["explain", "what is", "theory", "sdg", "voluntary", "compliance"]),
    (Intent::Insights, &["insight", "data", "project-specific", "trustworthy", "seller"]),
];

/// Lenient JSON extraction from model output.
///
/// Tries the whole text, then the span from the first `{` to the last `}`.
/// Anything that is not a JSON object yields an empty map.
pub fn parse_label_json(text: &str) -> Map<String, Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) {
        return map;
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            match serde_json::from_str::<Value>(&text[start..=end]) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            }
        }
        _ => Map::new(),
    }
}

pub fn normalize_intent(label: &str) -> Intent {
    match label.trim().to_lowercase().as_str() {
        "market" | "market_analysis" | "marketplace" => Intent::MarketAnalysis,
        "recommend" | "recommendation" => Intent::Recommendation,
        "emission" | "emissions" | "impact" => Intent::Emissions,
        "theory" | "explain" => Intent::Theory,
        "insight" | "insights" | "data" => Intent::Insights,
        _ => Intent::General,
    }
}

/// Substring match over the lower-cased message. `General` when nothing hits.
pub fn keyword_intent(message: &str) -> Intent {
    let text = message.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

/// Intent carried by a model reply; a missing or non-string label is general.
pub fn intent_from_reply(reply: &str) -> Intent {
    let payload = parse_label_json(reply);
    let label = payload.get("label").and_then(Value::as_str).unwrap_or("general");
    normalize_intent(label)
}

/// Classifies `message` with the model, falling back to keywords when the model
/// answers `general`, answers nonsense, or cannot be reached.
pub async fn route(llm: &dyn LlmClient, message: &str) -> Intent {
    let classified = match llm.complete(ROUTER_SYSTEM_PROMPT, message).await {
        Ok(reply) => intent_from_reply(&reply),
        Err(error) => {
            tracing::warn!(
                event_name = "agent.router.llm_unavailable",
                error = %error,
                "intent classification failed, using keyword fallback"
            );
            Intent::General
        }
    };

    if classified == Intent::General {
        keyword_intent(message)
    } else {
        classified
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{intent_from_reply, keyword_intent, normalize_intent, parse_label_json, route, Intent};
    use crate::llm::{LlmError, ScriptedLlmClient};
    use crate::prompts::ROUTER_SYSTEM_PROMPT;

    #[test]
    fn parses_clean_and_wrapped_json() {
        assert_eq!(parse_label_json(r#"{"label":"theory"}"#)["label"], json!("theory"));
        assert_eq!(
            parse_label_json("Sure! {\"label\": \"emissions\", \"reason\": \"offsets\"} hope that helps")
                ["label"],
            json!("emissions")
        );
        assert!(parse_label_json("no json here").is_empty());
        assert!(parse_label_json("} backwards {").is_empty());
        assert!(parse_label_json("[1, 2]").is_empty());
    }

    #[test]
    fn normalizes_label_synonyms() {
        assert_eq!(normalize_intent(" Marketplace "), Intent::MarketAnalysis);
        assert_eq!(normalize_intent("recommend"), Intent::Recommendation);
        assert_eq!(normalize_intent("IMPACT"), Intent::Emissions);
        assert_eq!(normalize_intent("explain"), Intent::Theory);
        assert_eq!(normalize_intent("data"), Intent::Insights);
        assert_eq!(normalize_intent("weather"), Intent::General);
        assert_eq!(normalize_intent(""), Intent::General);
    }

    #[test]
    fn non_string_label_is_general() {
        assert_eq!(intent_from_reply(r#"{"label": 3}"#), Intent::General);
        assert_eq!(intent_from_reply(r#"{"reason": "none"}"#), Intent::General);
    }

    #[test]
    fn keyword_groups_are_checked_in_order() {
        assert_eq!(keyword_intent("What is the PRICE trend?"), Intent::MarketAnalysis);
        // "market" outranks "seller" because market keywords are checked first.
        assert_eq!(keyword_intent("which seller dominates the market"), Intent::MarketAnalysis);
        assert_eq!(keyword_intent("Suggest something"), Intent::Recommendation);
        assert_eq!(keyword_intent("how much CO2 is that"), Intent::Emissions);
        assert_eq!(keyword_intent("what is SDG 13"), Intent::Theory);
        assert_eq!(keyword_intent("is this seller trustworthy"), Intent::Insights);
        assert_eq!(keyword_intent("hello there"), Intent::General);
    }

    #[tokio::test]
    async fn model_label_wins_when_specific() {
        let llm = ScriptedLlmClient::always(r#"{"label": "theory", "reason": "concept"}"#);

        assert_eq!(route(&llm, "what is the price of solar").await, Intent::Theory);
        assert_eq!(llm.calls()[0].0, ROUTER_SYSTEM_PROMPT);
        assert_eq!(llm.calls()[0].1, "what is the price of solar");
    }

    #[tokio::test]
    async fn general_label_falls_back_to_keywords() {
        let llm = ScriptedLlmClient::always(r#"{"label": "general"}"#);
        assert_eq!(route(&llm, "Recommend credits for my startup").await, Intent::Recommendation);
    }

    #[tokio::test]
    async fn unreachable_model_falls_back_to_keywords() {
        let llm = ScriptedLlmClient::failing(LlmError::Transport("connection refused".to_string()));
        assert_eq!(route(&llm, "explain voluntary markets").await, Intent::Theory);
        assert_eq!(route(&llm, "good morning").await, Intent::General);
    }
}
