//! Display models for CLI output
//!
//! API types are converted into display rows here so command handlers only
//! pick a format.

pub mod display;

pub use display::{CallDisplay, CallSummary, InsightDisplay, InsightSummary, TranscriptSummary};
