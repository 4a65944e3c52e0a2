//! In-memory response cache for API reads
//!
//! Three pieces sit under the API client:
//! - [`ResponseCache`] serves decoded responses younger than the TTL
//! - [`InFlight`] coalesces concurrent identical requests into one network call
//! - [`ResponseCache::invalidate`] purges keys made stale by a mutation
//!
//! The cache is scoped to one authenticated session and is never persisted.

pub mod dedup;
pub mod key;
pub mod storage;

use std::time::Duration;

/// Maximum age at which a cached response is served without a network call.
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

/// Key patterns each mutating resource family invalidates on success.
///
/// List and aggregate endpoints embed the mutated entity, so a mutation
/// purges the whole family rather than one key.
pub struct Invalidates;

impl Invalidates {
    pub const CALL_CREATE: &'static [&'static str] = &["/calls", "/insights/batch"];
    pub const CALL_UPDATE: &'static [&'static str] = &["/calls", "/insights/batch"];
    pub const CALL_REMEDIATION: &'static [&'static str] = &["/calls"];

    /// Patterns for deleting one call, including its sub-resources.
    pub fn call_delete(call_id: i64) -> Vec<String> {
        vec![
            "/calls".to_string(),
            "/insights/batch".to_string(),
            format!("/insights/call/{}", call_id),
            format!("/transcripts/call/{}", call_id),
        ]
    }
}

pub use dedup::InFlight;
pub use key::CacheKey;
pub use storage::{CacheStats, ResponseCache};
