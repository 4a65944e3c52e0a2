//! Poll targets for the views the CLI can watch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::convergence::{CallListSnapshot, CallSnapshot};
use super::remediation::DurationBackfill;
use super::session::PollTarget;
use crate::client::models::{CallQuery, CallStatus};
use crate::client::{CallAnalyticsApi, CallsApi, Fetch, FetchOptions, InsightsApi};
use crate::error::{ApiError, Error, Result};

/// Call detail changes quickly while a recording is processed.
pub const DETAIL_INTERVAL: Duration = Duration::from_secs(3);

/// Listings are refreshed less often.
pub const LIST_INTERVAL: Duration = Duration::from_secs(10);

/// A sub-resource that is still generating or does not exist yet is simply absent.
fn optional<T>(fetched: Result<Fetch<T>>) -> Result<Option<T>> {
    match fetched {
        Ok(fetched) => Ok(fetched.ready()),
        Err(Error::Api(ApiError::NotFound(_))) => Ok(None),
        Err(err) => Err(err),
    }
}

/// One call with its transcript and insight.
pub struct CallDetailTarget<C> {
    client: Arc<C>,
    call_id: i64,
}

impl<C> CallDetailTarget<C> {
    pub fn new(client: Arc<C>, call_id: i64) -> Self {
        Self { client, call_id }
    }
}

#[async_trait]
impl<C: CallAnalyticsApi + 'static> PollTarget for CallDetailTarget<C> {
    type Snapshot = CallSnapshot;

    fn describe(&self) -> String {
        format!("call {}", self.call_id)
    }

    async fn fetch(&self, options: FetchOptions) -> Result<CallSnapshot> {
        let call = self.client.get_call(self.call_id, options).await?;

        // Reading these before processing finishes would queue generation early
        if call.status != CallStatus::Processed {
            return Ok(CallSnapshot {
                call,
                transcript: None,
                insight: None,
            });
        }

        let (transcript, insight) = tokio::join!(
            self.client.get_transcript(self.call_id, options),
            self.client.get_insight(self.call_id, options),
        );
        Ok(CallSnapshot {
            call,
            transcript: optional(transcript)?,
            insight: optional(insight)?,
        })
    }
}

/// One page of calls, their insights, and duration backfill.
pub struct CallListTarget<C> {
    client: Arc<C>,
    query: CallQuery,
    backfill: DurationBackfill<C>,
}

impl<C: CallsApi + 'static> CallListTarget<C> {
    pub fn new(client: Arc<C>, query: CallQuery, backfill: DurationBackfill<C>) -> Self {
        Self {
            client,
            query,
            backfill,
        }
    }
}

#[async_trait]
impl<C: CallsApi + InsightsApi + 'static> PollTarget for CallListTarget<C> {
    type Snapshot = CallListSnapshot;

    fn describe(&self) -> String {
        format!("calls page at offset {}", self.query.skip)
    }

    async fn fetch(&self, options: FetchOptions) -> Result<CallListSnapshot> {
        let mut page = self.client.list_calls(&self.query, options).await?;

        let processed: Vec<i64> = page
            .calls
            .iter()
            .filter(|call| call.status == CallStatus::Processed)
            .map(|call| call.id)
            .collect();
        let insights = match self.client.batch_insights(&processed, options).await {
            Ok(insights) => insights,
            Err(err) if err.as_api().is_some_and(ApiError::is_auth_failure) => return Err(err),
            Err(err) => {
                log::warn!("Batch insights unavailable: {}", err);
                HashMap::new()
            }
        };

        let backfill = self.backfill.run(&page.calls).await;
        backfill.apply(&mut page.calls);

        Ok(CallListSnapshot {
            page,
            insights,
            backfill,
        })
    }
}
