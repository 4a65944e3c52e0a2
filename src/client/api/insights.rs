//! Insights API trait: per-call analysis and the batch endpoint

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use super::calls::require_ready;
use crate::client::fetcher::Fetch;
use crate::client::models::Insight;
use crate::client::{ApiClient, FetchOptions, Resource, Transport};
use crate::error::Result;

/// Insight retrieval
#[async_trait]
pub trait InsightsApi: Send + Sync {
    /// Get the analysis for one call.
    ///
    /// Returns `Fetch::Pending` while the analysis is still being generated.
    async fn get_insight(&self, call_id: i64, options: FetchOptions) -> Result<Fetch<Insight>>;

    /// Get the analyses for many calls in one request.
    ///
    /// Calls without an analysis are absent from the map.
    async fn batch_insights(
        &self,
        call_ids: &[i64],
        options: FetchOptions,
    ) -> Result<HashMap<i64, Insight>>;
}

/// Sorted, de-duplicated id list so the cache key does not depend on order.
fn id_list(call_ids: &[i64]) -> String {
    call_ids
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl<T: Transport> InsightsApi for ApiClient<T> {
    async fn get_insight(&self, call_id: i64, options: FetchOptions) -> Result<Fetch<Insight>> {
        let resource = Resource::get(format!("/insights/call/{}", call_id));
        self.fetch_as(&resource, options).await
    }

    async fn batch_insights(
        &self,
        call_ids: &[i64],
        options: FetchOptions,
    ) -> Result<HashMap<i64, Insight>> {
        if call_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let resource = Resource::get("/insights/batch").query("call_ids", id_list(call_ids));
        let fetched = self.fetch_as(&resource, options).await?;
        require_ready(fetched, "Insights")
    }
}
