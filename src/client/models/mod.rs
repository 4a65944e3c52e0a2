//! Call-analytics API data models
//!
//! Domain types returned by the API, organized by resource type.

mod call;
mod insight;
mod stats;
mod transcript;

pub use call::{
    Call, CallCreate, CallQuery, CallStatus, CallUpdate, DurationExtraction, MAX_PAGE_SIZE, MutationAck,
    PaginatedCalls, Sentiment, UploadMethod,
};
pub use insight::Insight;
pub use stats::{DashboardStats, UploadMethodStats};
pub use transcript::Transcript;
