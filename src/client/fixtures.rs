//! Test fixtures and builders for API payloads
//!
//! Builders produce both typed models and the JSON the server would send,
//! so the same fixture can script a [`MockTransport`](super::MockTransport)
//! and be compared against decoded results.
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use serde_json::{Value, json};

use super::models::{Call, CallStatus, Insight, Sentiment, UploadMethod};

// ============================================================================
// CallBuilder
// ============================================================================

/// Builder for test calls.
///
/// # Example
/// ```ignore
/// let call = CallBuilder::new(5).processed().duration(312).build();
/// ```
#[derive(Debug, Clone)]
pub struct CallBuilder {
    id: i64,
    filename: String,
    status: CallStatus,
    duration: Option<i64>,
    score: Option<i64>,
    sentiment: Option<Sentiment>,
    sales_rep_name: Option<String>,
    upload_method: UploadMethod,
}

impl CallBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            filename: format!("call-{}.mp3", id),
            status: CallStatus::Processing,
            duration: None,
            score: None,
            sentiment: None,
            sales_rep_name: None,
            upload_method: UploadMethod::Manual,
        }
    }

    pub fn status(mut self, status: CallStatus) -> Self {
        self.status = status;
        self
    }

    pub fn processed(self) -> Self {
        self.status(CallStatus::Processed)
    }

    pub fn failed(self) -> Self {
        self.status(CallStatus::Failed)
    }

    pub fn duration(mut self, seconds: i64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn sales_rep(mut self, name: &str) -> Self {
        self.sales_rep_name = Some(name.to_string());
        self
    }

    pub fn s3_auto(mut self) -> Self {
        self.upload_method = UploadMethod::S3Auto;
        self
    }

    /// The call as the server would serialize it.
    pub fn json(&self) -> Value {
        json!({
            "id": self.id,
            "filename": self.filename,
            "s3_url": format!("https://calls.s3.amazonaws.com/{}", self.filename),
            "status": self.status.as_str(),
            "language": null,
            "translate_to_english": false,
            "upload_date": "2025-03-14T09:26:53.589793",
            "duration": self.duration,
            "score": self.score,
            "sentiment": self.sentiment.map(|s| s.as_str()),
            "client_id": 1,
            "sales_rep_id": null,
            "sales_rep_name": self.sales_rep_name,
            "upload_method": self.upload_method.as_str(),
        })
    }

    pub fn build(&self) -> Call {
        serde_json::from_value(self.json()).unwrap()
    }
}

/// A `PaginatedCalls` body for a list of calls.
pub fn page_json(calls: &[CallBuilder], skip: u64, limit: u64) -> Value {
    json!({
        "calls": calls.iter().map(CallBuilder::json).collect::<Vec<_>>(),
        "total": calls.len() as u64 + skip,
        "skip": skip,
        "limit": limit,
    })
}

// ============================================================================
// InsightBuilder
// ============================================================================

/// Builder for test insights.
#[derive(Debug, Clone)]
pub struct InsightBuilder {
    call_id: i64,
    sentiment: Sentiment,
    overall_score: i64,
    summary: String,
    key_topics: Vec<String>,
}

impl InsightBuilder {
    pub fn new(call_id: i64) -> Self {
        Self {
            call_id,
            sentiment: Sentiment::Positive,
            overall_score: 78,
            summary: format!("Summary for call {}", call_id),
            key_topics: vec!["pricing".to_string(), "timeline".to_string()],
        }
    }

    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn score(mut self, score: i64) -> Self {
        self.overall_score = score;
        self
    }

    pub fn json(&self) -> Value {
        json!({
            "call_id": self.call_id,
            "client_id": 1,
            "sentiment": self.sentiment.as_str(),
            "overall_score": self.overall_score,
            "summary": self.summary,
            "key_topics": self.key_topics,
            "improvement_areas": ["Ask more discovery questions"],
            "action_items": ["Send follow-up email"],
            "talk_time_ratio": 0.55,
            "engagement_score": 70,
            "deal_probability": 60,
            "follow_up_urgency": "Medium",
        })
    }

    pub fn build(&self) -> Insight {
        serde_json::from_value(self.json()).unwrap()
    }
}

/// A batch-insights body keyed by call id.
pub fn batch_json(insights: &[InsightBuilder]) -> Value {
    let map: serde_json::Map<String, Value> = insights
        .iter()
        .map(|i| (i.call_id.to_string(), i.json()))
        .collect();
    Value::Object(map)
}

pub fn transcript_json(call_id: i64) -> Value {
    json!({
        "call_id": call_id,
        "text": "Hi, thanks for joining. Let's walk through the proposal.",
        "speaker_labels": null,
        "created_at": "2025-03-14T09:40:00",
    })
}

pub fn extraction_json(duration: i64) -> Value {
    json!({
        "success": true,
        "message": format!("Duration extracted successfully: {}s", duration),
        "duration": duration,
        "duration_formatted": format!("{}:{:02}", duration / 60, duration % 60),
    })
}
