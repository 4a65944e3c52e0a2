//! Calls API trait: listing, detail, and call mutations

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::Invalidates;
use crate::client::fetcher::Fetch;
use crate::client::models::{
    Call, CallCreate, CallQuery, CallUpdate, DashboardStats, DurationExtraction, MutationAck,
    PaginatedCalls,
};
use crate::client::{ApiClient, FetchOptions, Resource, Transport};
use crate::error::{ApiError, Result};

/// Call operations for the call-analytics API
#[async_trait]
pub trait CallsApi: Send + Sync {
    // ========================================================================
    // Read Operations
    // ========================================================================

    /// List one page of calls matching `query`.
    async fn list_calls(&self, query: &CallQuery, options: FetchOptions) -> Result<PaginatedCalls>;

    /// Get a single call.
    async fn get_call(&self, call_id: i64, options: FetchOptions) -> Result<Call>;

    /// Dashboard counters across every call visible to the caller.
    async fn call_stats(&self, options: FetchOptions) -> Result<DashboardStats>;

    // ========================================================================
    // Write Operations
    // ========================================================================

    /// Register a recording; the server starts processing it immediately.
    ///
    /// Invalidates every call listing, aggregate and batch insight on success.
    async fn create_call(&self, call: &CallCreate) -> Result<Call>;

    /// Update status, score or duration.
    ///
    /// Invalidates every call listing and batch insight on success.
    async fn update_call(&self, call_id: i64, update: &CallUpdate) -> Result<MutationAck>;

    /// Delete a call and its recording, transcript and insights.
    async fn delete_call(&self, call_id: i64) -> Result<MutationAck>;

    /// Ask the server to measure the recording and store its duration.
    async fn extract_duration(&self, call_id: i64) -> Result<DurationExtraction>;
}

/// Collections and detail records are never generated lazily, so a 202 here
/// means the server answered something unexpected.
pub(crate) fn require_ready<T>(fetched: Fetch<T>, what: &str) -> Result<T> {
    fetched.ready().ok_or_else(|| {
        ApiError::InvalidResponse(format!("{} is not available yet", what)).into()
    })
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into())
}

pub(crate) fn call_path(call_id: i64) -> String {
    format!("/calls/{}", call_id)
}

#[async_trait]
impl<T: Transport> CallsApi for ApiClient<T> {
    async fn list_calls(&self, query: &CallQuery, options: FetchOptions) -> Result<PaginatedCalls> {
        let mut resource = Resource::get("/calls/");
        resource.query = query.to_query();
        let fetched = self.fetch_as(&resource, options).await?;
        require_ready(fetched, "Call list")
    }

    async fn get_call(&self, call_id: i64, options: FetchOptions) -> Result<Call> {
        let fetched = self.fetch_as(&Resource::get(call_path(call_id)), options).await?;
        require_ready(fetched, "Call")
    }

    async fn call_stats(&self, options: FetchOptions) -> Result<DashboardStats> {
        let fetched = self.fetch_as(&Resource::get("/calls/stats"), options).await?;
        require_ready(fetched, "Call statistics")
    }

    async fn create_call(&self, call: &CallCreate) -> Result<Call> {
        let payload = serde_json::to_value(call)?;
        let response = self
            .mutate(&Resource::post("/calls/"), Some(&payload), Invalidates::CALL_CREATE)
            .await?;
        decode(response)
    }

    async fn update_call(&self, call_id: i64, update: &CallUpdate) -> Result<MutationAck> {
        let payload = serde_json::to_value(update)?;
        let response = self
            .mutate(
                &Resource::put(call_path(call_id)),
                Some(&payload),
                Invalidates::CALL_UPDATE,
            )
            .await?;
        if response.is_null() {
            return Ok(MutationAck {
                message: "Call updated".to_string(),
                call_id: Some(call_id),
            });
        }
        decode(response)
    }

    async fn delete_call(&self, call_id: i64) -> Result<MutationAck> {
        let response = self
            .mutate(
                &Resource::delete(call_path(call_id)),
                None,
                &Invalidates::call_delete(call_id),
            )
            .await?;
        if response.is_null() {
            return Ok(MutationAck {
                message: "Call deleted".to_string(),
                call_id: Some(call_id),
            });
        }
        decode(response)
    }

    async fn extract_duration(&self, call_id: i64) -> Result<DurationExtraction> {
        let resource = Resource::post(format!("/calls/{}/extract-duration", call_id));
        let response = self
            .mutate(&resource, None, Invalidates::CALL_REMEDIATION)
            .await?;
        decode(response)
    }
}
