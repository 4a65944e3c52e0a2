//! Insight models

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::call::{Sentiment, deserialize_opt_sentiment};

/// List fields arrive as arrays, JSON-encoded strings, or plain strings
/// depending on how the row was written.
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn flatten(value: Value) -> Vec<String> {
        match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(parsed @ Value::Array(_)) => flatten(parsed),
                _ if s.trim().is_empty() => Vec::new(),
                _ => vec![s],
            },
            other => vec![other.to_string()],
        }
    }

    Ok(flatten(Value::deserialize(deserializer)?))
}

/// AI-generated analysis of a call.
///
/// Only the fields the CLI renders are typed; the rest of the analysis is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub call_id: i64,

    #[serde(default, deserialize_with = "deserialize_opt_sentiment")]
    pub sentiment: Option<Sentiment>,

    #[serde(default)]
    pub overall_score: Option<i64>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub key_topics: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub action_items: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub improvement_areas: Vec<String>,

    /// Likelihood of closing, 0-100
    #[serde(default)]
    pub deal_probability: Option<i64>,

    #[serde(default)]
    pub engagement_score: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insight_deserializes_and_keeps_extra_fields() {
        let insight: Insight = serde_json::from_value(json!({
            "call_id": 9,
            "client_id": 1,
            "sentiment": "neutral",
            "overall_score": 71,
            "summary": "Prospect asked for pricing tiers.",
            "key_topics": ["pricing", "onboarding"],
            "improvement_areas": null,
            "action_items": "[\"Send pricing sheet\"]",
            "talk_time_ratio": 0.62,
            "deal_probability": 40,
            "follow_up_urgency": "High"
        }))
        .unwrap();

        assert_eq!(insight.sentiment, Some(Sentiment::Neutral));
        assert_eq!(insight.key_topics, vec!["pricing", "onboarding"]);
        assert_eq!(insight.action_items, vec!["Send pricing sheet"]);
        assert!(insight.improvement_areas.is_empty());
        assert_eq!(insight.extra.get("talk_time_ratio"), Some(&json!(0.62)));
        assert_eq!(insight.extra.get("follow_up_urgency"), Some(&json!("High")));
    }

    #[test]
    fn test_plain_string_list_field() {
        let insight: Insight = serde_json::from_value(json!({
            "call_id": 9,
            "key_topics": "renewal"
        }))
        .unwrap();
        assert_eq!(insight.key_topics, vec!["renewal"]);
    }
}
