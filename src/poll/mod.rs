//! Polling, convergence, and remediation
//!
//! A [`Poller`] drives one [`PollTarget`] per watched view: a fresh fetch on
//! subscribe, then cache-aware fetches on every tick until the snapshot is
//! [`Convergent`], the handle is dropped, or the session ends.

mod convergence;
mod remediation;
mod session;
mod targets;

pub use convergence::{CallListSnapshot, CallSnapshot, Convergent, call_row_settled};
pub use remediation::{BackfillReport, DurationBackfill, ExtractionGuard, GuardTicket, needs_backfill};
pub use session::{
    DEFAULT_MAX_ATTEMPTS, PollConfig, PollHandle, PollPhase, PollState, PollTarget, Poller,
    StopReason,
};
pub use targets::{CallDetailTarget, CallListTarget, DETAIL_INTERVAL, LIST_INTERVAL};
