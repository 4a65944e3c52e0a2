//! Insight display models

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::Insight;
use crate::output::formatters::{or_dash, truncate};
use crate::output::table::format_record;

/// Insight row for batch output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct InsightDisplay {
    #[tabled(rename = "CALL")]
    pub call_id: i64,

    #[tabled(rename = "SCORE")]
    pub score: String,

    #[tabled(rename = "SENTIMENT")]
    pub sentiment: String,

    #[tabled(rename = "DEAL %")]
    pub deal_probability: String,

    #[tabled(rename = "TOPICS")]
    pub topics: String,
}

impl From<&Insight> for InsightDisplay {
    fn from(insight: &Insight) -> Self {
        Self {
            call_id: insight.call_id,
            score: or_dash(insight.overall_score),
            sentiment: or_dash(insight.sentiment),
            deal_probability: or_dash(insight.deal_probability),
            topics: truncate(&insight.key_topics.join(", "), 40),
        }
    }
}

/// Pretty view of one insight.
pub struct InsightSummary<'a>(pub &'a Insight);

fn bullets(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("\n{}:\n", title);
    for item in items {
        out.push_str(&format!("  - {}\n", item));
    }
    out
}

impl std::fmt::Display for InsightSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let insight = self.0;
        let fields = [
            ("Call", format!("#{}", insight.call_id)),
            ("Score", or_dash(insight.overall_score)),
            ("Sentiment", or_dash(insight.sentiment)),
            ("Deal probability", or_dash(insight.deal_probability.map(|p| format!("{}%", p)))),
            ("Engagement", or_dash(insight.engagement_score)),
        ];
        write!(f, "{}", format_record(&fields))?;

        if let Some(summary) = insight.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            write!(f, "\n\nSummary:\n  {}\n", summary.trim())?;
        }
        write!(f, "{}", bullets("Key topics", &insight.key_topics))?;
        write!(f, "{}", bullets("Action items", &insight.action_items))?;
        write!(f, "{}", bullets("Improvement areas", &insight.improvement_areas))
    }
}
