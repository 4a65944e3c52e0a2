//! Convergence rules
//!
//! A polled entity has converged once its status is terminal and every
//! sub-resource expected for that status is present. Polling stops there.

use std::collections::HashMap;

use serde::Serialize;

use super::remediation::BackfillReport;
use crate::client::models::{Call, CallStatus, Insight, PaginatedCalls, Transcript};

/// Whether a snapshot is final.
///
/// Must be monotone: once true for a snapshot, it stays true for any more
/// complete snapshot of the same entity.
pub trait Convergent {
    fn is_converged(&self) -> bool;
}

/// A call and the sub-resources available when it was observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSnapshot {
    pub call: Call,
    pub transcript: Option<Transcript>,
    pub insight: Option<Insight>,
}

impl Convergent for CallSnapshot {
    fn is_converged(&self) -> bool {
        match self.call.status {
            // A failed call never gets a transcript or insight
            CallStatus::Failed => true,
            CallStatus::Processed => self.transcript.is_some() && self.insight.is_some(),
            CallStatus::Processing => false,
        }
    }
}

/// One page of calls with whatever insights exist for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallListSnapshot {
    pub page: PaginatedCalls,
    pub insights: HashMap<i64, Insight>,
    pub backfill: BackfillReport,
}

/// List-row rule: a processed call also needs its insight and a duration.
pub fn call_row_settled(call: &Call, has_insight: bool) -> bool {
    match call.status {
        CallStatus::Failed => true,
        CallStatus::Processed => has_insight && call.duration.is_some(),
        CallStatus::Processing => false,
    }
}

impl Convergent for CallListSnapshot {
    fn is_converged(&self) -> bool {
        self.page
            .calls
            .iter()
            .all(|call| call_row_settled(call, self.insights.contains_key(&call.id)))
    }
}
