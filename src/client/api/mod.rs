//! API trait definitions split by resource
//!
//! - [`CallsApi`] - Call listing, detail and mutations
//! - [`TranscriptsApi`] - Transcripts (may be pending)
//! - [`InsightsApi`] - Per-call and batch analysis (may be pending)
//!
//! The [`CallAnalyticsApi`] super-trait combines all three.

mod calls;
mod insights;
mod transcripts;

pub use calls::CallsApi;
pub use insights::InsightsApi;
pub use transcripts::TranscriptsApi;

/// Full API surface, implemented for anything that implements every part.
pub trait CallAnalyticsApi: CallsApi + TranscriptsApi + InsightsApi {}

impl<T: CallsApi + TranscriptsApi + InsightsApi> CallAnalyticsApi for T {}
