//! Missing-duration remediation
//!
//! Some calls finish processing without a stored duration. For each such
//! call we ask the server to measure the recording, at most once at a time
//! per call, and patch the measured value into local state as soon as it
//! arrives.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use log::{debug, warn};
use serde::Serialize;

use crate::client::CallsApi;
use crate::client::models::{Call, CallStatus};

/// Calls that currently have a remediation request outstanding.
#[derive(Debug, Default)]
pub struct ExtractionGuard {
    active: Mutex<HashSet<i64>>,
}

impl ExtractionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `call_id`, or `None` if a request for it is already outstanding.
    ///
    /// The claim is held by the returned ticket and released when the ticket
    /// drops, however the request ends.
    pub fn try_acquire(self: &Arc<Self>, call_id: i64) -> Option<GuardTicket> {
        if !self.lock().insert(call_id) {
            return None;
        }
        Some(GuardTicket {
            guard: Arc::clone(self),
            call_id,
        })
    }

    pub fn contains(&self, call_id: i64) -> bool {
        self.lock().contains(&call_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive claim on one call id in an [`ExtractionGuard`].
#[derive(Debug)]
pub struct GuardTicket {
    guard: Arc<ExtractionGuard>,
    call_id: i64,
}

impl GuardTicket {
    pub fn call_id(&self) -> i64 {
        self.call_id
    }
}

impl Drop for GuardTicket {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.call_id);
    }
}

/// Outcome of one backfill pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// Call id to measured duration in seconds
    pub patched: BTreeMap<i64, i64>,
    /// Call id and reason
    pub failed: Vec<(i64, String)>,
    /// Already being remediated by someone else
    pub skipped: Vec<i64>,
}

impl BackfillReport {
    pub fn is_empty(&self) -> bool {
        self.patched.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Write measured durations into `calls`.
    pub fn apply(&self, calls: &mut [Call]) {
        for call in calls.iter_mut() {
            if let Some(duration) = self.patched.get(&call.id) {
                call.duration = Some(*duration);
            }
        }
    }
}

/// Requests durations for processed calls that lack one.
pub struct DurationBackfill<C> {
    client: Arc<C>,
    guard: Arc<ExtractionGuard>,
}

impl<C> Clone for DurationBackfill<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            guard: Arc::clone(&self.guard),
        }
    }
}

/// Processed, but no duration stored.
pub fn needs_backfill(call: &Call) -> bool {
    call.status == CallStatus::Processed && call.duration.is_none()
}

impl<C: CallsApi + 'static> DurationBackfill<C> {
    pub fn new(client: Arc<C>, guard: Arc<ExtractionGuard>) -> Self {
        Self { client, guard }
    }

    /// Remediate every call in `calls` that needs it.
    ///
    /// Each request runs as its own task: one failure does not affect the
    /// others, and abandoning the pass does not cancel requests already sent.
    /// Failures are reported, not retried; the next pass may try again.
    pub async fn run(&self, calls: &[Call]) -> BackfillReport {
        let mut report = BackfillReport::default();
        let mut tasks = Vec::new();

        for call in calls.iter().filter(|c| needs_backfill(c)) {
            let Some(ticket) = self.guard.try_acquire(call.id) else {
                debug!("Duration extraction already running for call {}", call.id);
                report.skipped.push(call.id);
                continue;
            };
            let client = Arc::clone(&self.client);
            tasks.push((
                call.id,
                tokio::spawn(async move {
                    let result = client.extract_duration(ticket.call_id()).await;
                    drop(ticket);
                    result
                }),
            ));
        }

        let (ids, handles): (Vec<i64>, Vec<_>) = tasks.into_iter().unzip();
        for (call_id, joined) in ids.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(extraction)) => match (extraction.success, extraction.duration) {
                    (true, Some(duration)) => {
                        debug!("Call {} duration backfilled: {}s", call_id, duration);
                        report.patched.insert(call_id, duration);
                    }
                    _ => report.failed.push((call_id, extraction.message)),
                },
                Ok(Err(err)) => {
                    warn!("Duration extraction failed for call {}: {}", call_id, err);
                    report.failed.push((call_id, err.to_string()));
                }
                Err(join_err) => report.failed.push((call_id, join_err.to_string())),
            }
        }
        report
    }
}
