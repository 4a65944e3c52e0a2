//! Call-analytics API client
//!
//! [`ApiClient`] is the single data-access layer for the API. Reads go
//! through a TTL cache and a request coalescer; mutations go straight to the
//! network and purge the cache keys they make stale. A rejected session
//! clears everything and cancels every poll started from this client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheStats, InFlight, ResponseCache};
use crate::error::{ApiError, Result};

pub mod api;
#[cfg(test)]
pub mod fixtures;
pub mod fetcher;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rate_limit;
pub mod resource;
pub mod token;
pub mod transport;

pub use api::{CallAnalyticsApi, CallsApi, InsightsApi, TranscriptsApi};
pub use fetcher::Fetch;
#[cfg(test)]
pub use mock::{MockResponse, MockTransport};
pub use resource::{FetchOptions, Resource};
pub use transport::{HttpTransport, Transport};

/// Notified when the server rejects the session.
pub trait SessionBoundary: Send + Sync {
    fn on_session_expired(&self);
}

/// Boundary that only logs.
pub struct LogBoundary;

impl SessionBoundary for LogBoundary {
    fn on_session_expired(&self) {
        warn!("Session expired; cached data discarded");
    }
}

/// Data-access layer over a [`Transport`].
pub struct ApiClient<T: Transport> {
    transport: Arc<T>,
    cache: Arc<ResponseCache>,
    in_flight: InFlight<Fetch<Value>>,
    session: CancellationToken,
    session_ended: AtomicBool,
    boundary: Arc<dyn SessionBoundary>,
    bypass_cache: bool,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client with a fresh default-TTL cache.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: Arc::new(ResponseCache::new()),
            in_flight: InFlight::new(),
            session: CancellationToken::new(),
            session_ended: AtomicBool::new(false),
            boundary: Arc::new(LogBoundary),
            bypass_cache: false,
        }
    }

    /// Use a shared cache instead of a private one.
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_boundary(mut self, boundary: Arc<dyn SessionBoundary>) -> Self {
        self.boundary = boundary;
        self
    }

    /// Treat every read as a skip-cache read (for `--no-cache`).
    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Token cancelled when the session ends; poll sessions derive from it.
    pub fn session(&self) -> &CancellationToken {
        &self.session
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Number of reads currently on the wire.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop every cached response (logout or identity change).
    pub fn clear(&self) {
        let cleared = self.cache.clear();
        self.in_flight.forget_all();
        debug!("Cleared {} cached responses", cleared);
    }

    /// Fetch a resource.
    ///
    /// Reads are served from the cache when fresh (unless `skip_cache`),
    /// otherwise coalesced with any identical read already on the wire.
    /// Ready payloads populate the cache; pending responses and failures
    /// never do.
    pub async fn fetch(&self, resource: &Resource, options: FetchOptions) -> Result<Fetch<Value>> {
        let outcome = self.fetch_shared(resource, options).await;
        Ok(self.observe(outcome)?)
    }

    /// Fetch and deserialize a resource.
    pub async fn fetch_as<D: DeserializeOwned>(
        &self,
        resource: &Resource,
        options: FetchOptions,
    ) -> Result<Fetch<D>> {
        Ok(self.fetch(resource, options).await?.decode()?)
    }

    async fn fetch_shared(
        &self,
        resource: &Resource,
        options: FetchOptions,
    ) -> std::result::Result<Fetch<Value>, ApiError> {
        if !resource.is_read() {
            let raw = self.transport.send(resource, None).await?;
            return fetcher::classify(raw);
        }

        let key = resource.cache_key();
        if !(options.skip_cache || self.bypass_cache) {
            if let Some(value) = self.cache.get(&key) {
                debug!("Cache hit: {}", key);
                return Ok(Fetch::Ready(value));
            }
            debug!("Cache miss: {}", key);
        }

        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let request = resource.clone();
        let store_key = key.clone();

        self.in_flight
            .dedupe(key, move || {
                let epoch = cache.epoch();
                async move {
                    let fetched = fetcher::classify(transport.send(&request, None).await?)?;
                    if let Fetch::Ready(value) = &fetched {
                        cache.put_since(epoch, store_key, value.clone());
                    }
                    Ok(fetched)
                }
            })
            .await
    }

    /// Perform a mutation and invalidate `invalidates` on success.
    ///
    /// Never cached or coalesced. A 202 or empty body yields `Value::Null`.
    pub async fn mutate<S: AsRef<str>>(
        &self,
        resource: &Resource,
        payload: Option<&Value>,
        invalidates: &[S],
    ) -> Result<Value> {
        let outcome = match self.transport.send(resource, payload).await {
            Ok(raw) => fetcher::classify(raw),
            Err(err) => Err(err),
        };
        let fetched = self.observe(outcome)?;

        self.cache.invalidate(invalidates);
        self.in_flight.forget_matching(invalidates);
        Ok(fetched.ready().unwrap_or(Value::Null))
    }

    /// Session-boundary check applied to every outcome.
    fn observe<V>(
        &self,
        outcome: std::result::Result<V, ApiError>,
    ) -> std::result::Result<V, ApiError> {
        if let Err(err) = &outcome
            && err.is_auth_failure()
            && !self.session_ended.swap(true, Ordering::SeqCst)
        {
            warn!("Server rejected the access token; ending session");
            self.cache.clear();
            self.in_flight.forget_all();
            self.session.cancel();
            self.boundary.on_session_expired();
        }
        outcome
    }
}
