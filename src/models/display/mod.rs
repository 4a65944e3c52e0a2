//! Display model implementations for table and JSON output

mod call;
mod insight;

pub use call::{CallDisplay, CallSummary, TranscriptSummary};
pub use insight::{InsightDisplay, InsightSummary};
