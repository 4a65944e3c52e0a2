//! Call models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-side processing state of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Processing,
    Processed,
    Failed,
}

impl CallStatus {
    /// Whether the server will not move the call to another status on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Processed | CallStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Processing => "PROCESSING",
            CallStatus::Processed => "PROCESSED",
            CallStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROCESSING" => Ok(CallStatus::Processing),
            "PROCESSED" => Ok(CallStatus::Processed),
            "FAILED" => Ok(CallStatus::Failed),
            other => Err(format!(
                "unknown status '{}' (expected PROCESSING, PROCESSED or FAILED)",
                other
            )),
        }
    }
}

/// Overall tone of a call as judged by the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older rows carry the enum name ("SentimentType.POSITIVE")
        let name = s.trim().rsplit('.').next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sentiment that tolerates `null`, `"None"` and unrecognised values.
pub(crate) fn deserialize_opt_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// How the recording reached the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadMethod {
    Manual,
    S3Auto,
}

impl UploadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMethod::Manual => "MANUAL",
            UploadMethod::S3Auto => "S3_AUTO",
        }
    }
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MANUAL" => Ok(UploadMethod::Manual),
            "S3_AUTO" | "S3" => Ok(UploadMethod::S3Auto),
            other => Err(format!(
                "unknown upload method '{}' (expected MANUAL or S3_AUTO)",
                other
            )),
        }
    }
}

/// Timestamps are naive UTC on the server; accept an offset too.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(Some(naive));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.naive_utc()))
        .map_err(serde::de::Error::custom)
}

/// A recorded sales call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: i64,

    pub filename: String,

    pub status: CallStatus,

    /// Spoken language; `None` means auto-detect
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub translate_to_english: bool,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub upload_date: Option<NaiveDateTime>,

    /// Length in seconds. May stay empty after processing, see `DurationBackfill`.
    #[serde(default)]
    pub duration: Option<i64>,

    /// Overall score 0-100
    #[serde(default)]
    pub score: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_opt_sentiment")]
    pub sentiment: Option<Sentiment>,

    #[serde(default)]
    pub client_id: Option<i64>,

    #[serde(default)]
    pub sales_rep_id: Option<i64>,

    #[serde(default)]
    pub sales_rep_name: Option<String>,

    #[serde(default)]
    pub upload_method: Option<UploadMethod>,
}

/// One page of calls plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedCalls {
    pub calls: Vec<Call>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// Fields accepted by `PUT /calls/{id}`; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CallStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl CallUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.score.is_none() && self.duration.is_none()
    }
}

/// Body of `POST /calls/`: registers a recording already stored in S3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallCreate {
    pub filename: String,

    pub s3_url: String,

    /// `None` lets the server auto-detect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default)]
    pub translate_to_english: bool,
}

/// Acknowledgement returned by call update and delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub call_id: Option<i64>,
}

/// Result of asking the server to measure a call's audio length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationExtraction {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub duration: Option<i64>,

    #[serde(default)]
    pub duration_formatted: Option<String>,
}

/// Filters and paging for the call list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallQuery {
    pub skip: u32,
    pub limit: u32,
    pub status: Option<CallStatus>,
    pub sales_rep: Option<String>,
    pub upload_method: Option<UploadMethod>,
    /// Matches filename or call id
    pub search: Option<String>,
}

/// Server-side page size ceiling.
pub const MAX_PAGE_SIZE: u32 = 200;

impl Default for CallQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 50,
            status: None,
            sales_rep: None,
            upload_method: None,
            search: None,
        }
    }
}

impl CallQuery {
    /// Query string pairs in the server's parameter names.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("skip".to_string(), self.skip.to_string()),
            ("limit".to_string(), self.limit.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(status) = self.status {
            params.push(("status_filter".to_string(), status.to_string()));
        }
        if let Some(ref rep) = self.sales_rep {
            params.push(("sales_rep_filter".to_string(), rep.clone()));
        }
        if let Some(method) = self.upload_method {
            params.push(("upload_method_filter".to_string(), method.to_string()));
        }
        if let Some(ref term) = self.search
            && !term.trim().is_empty()
        {
            params.push(("search_term".to_string(), term.trim().to_string()));
        }
        params
    }
}
