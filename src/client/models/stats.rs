//! Dashboard aggregate models

use serde::{Deserialize, Serialize};

use super::Call;

/// Calls per upload method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadMethodStats {
    #[serde(default)]
    pub manual: u64,

    #[serde(default)]
    pub s3_auto: u64,
}

/// Aggregate counters from `GET /calls/stats`, scoped to the caller's role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_calls: u64,

    #[serde(default)]
    pub processed_calls: u64,

    #[serde(default)]
    pub processing_calls: u64,

    #[serde(default)]
    pub failed_calls: u64,

    /// Mean score of processed calls, rounded; 0 when none are scored
    #[serde(default)]
    pub average_score: i64,

    #[serde(default)]
    pub upload_method_stats: UploadMethodStats,

    /// Five most recent uploads
    #[serde(default)]
    pub recent_calls: Vec<Call>,
}
