//! Per-endpoint rate limiting for the call-analytics API
//!
//! Limiting is reactive: a family's limiter only engages after the server
//! has answered one of its requests with a 429.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::Method;

/// Families of endpoints that share a rate budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// /calls reads and updates
    Calls,
    /// /insights/call/{id} and /insights/batch
    Insights,
    /// /transcripts/call/{id}
    Transcripts,
    /// POST /calls/{id}/extract-duration, which downloads audio server-side
    Remediation,
    Default,
}

impl EndpointCategory {
    pub const ALL: [EndpointCategory; 5] = [
        EndpointCategory::Calls,
        EndpointCategory::Insights,
        EndpointCategory::Transcripts,
        EndpointCategory::Remediation,
        EndpointCategory::Default,
    ];

    /// Categorize a request by its path relative to the API root.
    pub fn from_request(path: &str, method: &Method) -> Self {
        let path = path.strip_prefix("/api").unwrap_or(path);

        if path.starts_with("/calls/") && path.ends_with("/extract-duration") && *method == Method::POST
        {
            return EndpointCategory::Remediation;
        }
        if path.starts_with("/calls") {
            return EndpointCategory::Calls;
        }
        if path.starts_with("/insights") {
            return EndpointCategory::Insights;
        }
        if path.starts_with("/transcripts") {
            return EndpointCategory::Transcripts;
        }

        EndpointCategory::Default
    }

    /// Requests per second once throttling is active.
    pub fn rate_limit(&self) -> f64 {
        match self {
            EndpointCategory::Calls => 10.0,
            EndpointCategory::Insights => 10.0,
            EndpointCategory::Transcripts => 5.0,
            EndpointCategory::Remediation => 0.5, // 30 per minute
            EndpointCategory::Default => 5.0,
        }
    }
}

/// Rate limiter state for a single endpoint category.
pub struct EndpointRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    category: EndpointCategory,
}

impl EndpointRateLimiter {
    pub fn new(category: EndpointCategory) -> Self {
        let rate = category.rate_limit();

        // Sub-1 rates become per-minute quotas
        let quota = if rate >= 1.0 {
            Quota::per_second(NonZeroU32::new(rate as u32).unwrap_or(NonZeroU32::MIN))
        } else {
            let per_min = (rate * 60.0).round() as u32;
            Quota::per_minute(NonZeroU32::new(per_min).unwrap_or(NonZeroU32::MIN))
        };

        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
            category,
        }
    }

    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {:?}", self.category);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if rate limiting is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for rate limiter {:?}", self.category);
            self.limiter.until_ready().await;
        }
    }
}

/// One limiter per endpoint category, created up front.
pub struct RateLimiterSet {
    limiters: HashMap<EndpointCategory, EndpointRateLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterSet {
    pub fn new() -> Self {
        let limiters = EndpointCategory::ALL
            .into_iter()
            .map(|category| (category, EndpointRateLimiter::new(category)))
            .collect();
        Self { limiters }
    }

    /// Wait for rate limit permission for a category (if active).
    pub async fn wait_for(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.wait_if_active().await;
        }
    }

    /// Activate rate limiting for a category (called on 429).
    pub fn activate(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.activate();
        }
    }

    pub fn is_active(&self, category: EndpointCategory) -> bool {
        self.limiters
            .get(&category)
            .is_some_and(EndpointRateLimiter::is_active)
    }
}
