//! Coalescing of concurrent identical requests
//!
//! The first caller for a key starts the request; every caller arriving while
//! it is outstanding joins the same result. The registry entry is removed when
//! the request settles, before any awaiter observes the outcome, or earlier
//! when a mutation makes the outstanding request stale.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;

use super::CacheKey;
use crate::error::ApiError;

/// Future shared by every caller of one in-flight request.
pub type SharedRequest<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

/// A registered request, tagged so a detached request cannot evict its successor.
struct Slot<T: Clone + Send + Sync + 'static> {
    id: u64,
    request: SharedRequest<T>,
}

type Registry<T> = Arc<Mutex<HashMap<CacheKey, Slot<T>>>>;

/// Registry of requests currently executing, at most one per key.
pub struct InFlight<T: Clone + Send + Sync + 'static> {
    pending: Registry<T>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> Default for InFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T: Clone + Send + Sync + 'static>(
    registry: &Registry<T>,
) -> MutexGuard<'_, HashMap<CacheKey, Slot<T>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone + Send + Sync + 'static> InFlight<T> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Join the in-flight request for `key`, or start one with `producer`.
    ///
    /// `producer` is invoked only when nothing is pending for `key`. The
    /// request runs as its own task, so dropping every awaiter does not
    /// cancel it and cannot leave a stale registry entry behind. Errors are
    /// delivered to every awaiter and are never retained.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dedupe<F, Fut>(&self, key: CacheKey, producer: F) -> SharedRequest<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if let Some(existing) = pending.get(&key) {
            debug!("Joining in-flight request: {}", key);
            return existing.request.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.pending);
        let task_key = key.clone();
        let request = producer();
        // The task needs the registry lock to settle, which we hold until the
        // entry below is inserted.
        let task = tokio::spawn(async move {
            let result = request.await;
            let mut pending = lock(&registry);
            if pending.get(&task_key).is_some_and(|slot| slot.id == id) {
                pending.remove(&task_key);
            }
            result
        });

        let shared = async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => Err(ApiError::Network(format!(
                    "Request task failed: {}",
                    join_err
                ))),
            }
        }
        .boxed()
        .shared();

        pending.insert(
            key,
            Slot {
                id,
                request: shared.clone(),
            },
        );
        shared
    }

    /// Detach every outstanding request whose key contains any of `patterns`.
    ///
    /// Detached requests still settle for the callers already awaiting them,
    /// but later callers start a new request instead of joining. Returns the
    /// number of requests detached.
    pub fn forget_matching<S: AsRef<str>>(&self, patterns: &[S]) -> usize {
        let mut pending = lock(&self.pending);
        let before = pending.len();
        pending.retain(|key, _| !patterns.iter().any(|p| key.matches(p.as_ref())));
        let detached = before - pending.len();
        if detached > 0 {
            debug!("Detached {} in-flight requests made stale by a mutation", detached);
        }
        detached
    }

    /// Detach every outstanding request.
    pub fn forget_all(&self) -> usize {
        let mut pending = lock(&self.pending);
        let detached = pending.len();
        pending.clear();
        detached
    }

    /// Whether a request is outstanding for `key`.
    pub fn is_pending(&self, key: &CacheKey) -> bool {
        lock(&self.pending).contains_key(key)
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_producer(
        calls: &Arc<AtomicUsize>,
        result: Result<u32, ApiError>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, ApiError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_producer() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");

        let first = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(5)));
        let second = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(99)));

        let (a, b) = tokio::join!(first, second);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Ok(5));
        assert_eq!(b, Ok(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_callers_receive_same_rejection() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");
        let error = ApiError::ServerError("boom".to_string());

        let requests: Vec<_> = (0..4)
            .map(|_| in_flight.dedupe(key.clone(), counting_producer(&calls, Err(error.clone()))))
            .collect();
        let results = futures::future::join_all(requests).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r == &Err(error.clone())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_removed_after_settlement_allows_retry() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");

        let failed = in_flight
            .dedupe(key.clone(), counting_producer(&calls, Err(ApiError::Forbidden)))
            .await;
        assert!(failed.is_err());
        assert!(!in_flight.is_pending(&key));

        let retried = in_flight
            .dedupe(key.clone(), counting_producer(&calls, Ok(7)))
            .await;

        assert_eq!(retried, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(in_flight.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_awaiters_do_not_leave_entry() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");

        let request = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(1)));
        assert!(in_flight.is_pending(&key));
        drop(request);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!in_flight.is_pending(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_run_independently() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = in_flight.dedupe(CacheKey::from("GET:/calls/1"), counting_producer(&calls, Ok(1)));
        let b = in_flight.dedupe(CacheKey::from("GET:/calls/2"), counting_producer(&calls, Ok(2)));
        assert_eq!(in_flight.len(), 2);

        let (a, b) = tokio::join!(a, b);

        assert_eq!((a, b), (Ok(1), Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forgotten_request_is_not_joined() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");

        let stale = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(1)));
        assert_eq!(in_flight.forget_matching(&["/calls"]), 1);
        assert!(!in_flight.is_pending(&key));

        let fresh = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(2)));
        let (stale, fresh) = tokio::join!(stale, fresh);

        assert_eq!(stale, Ok(1));
        assert_eq!(fresh, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_request_does_not_evict_successor() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("GET:/calls/5");

        let stale = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(1)));
        in_flight.forget_all();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = in_flight.dedupe(key.clone(), counting_producer(&calls, Ok(2)));

        assert_eq!(stale.await, Ok(1));
        assert!(in_flight.is_pending(&key));
        assert_eq!(fresh.await, Ok(2));
        assert!(in_flight.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forget_matching_keeps_unrelated_requests() {
        let in_flight = InFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let _calls = in_flight.dedupe(CacheKey::from("GET:/calls/5"), counting_producer(&calls, Ok(1)));
        let _transcript = in_flight.dedupe(
            CacheKey::from("GET:/transcripts/call/5"),
            counting_producer(&calls, Ok(2)),
        );

        assert_eq!(in_flight.forget_matching(&["/calls"]), 1);
        assert!(in_flight.is_pending(&CacheKey::from("GET:/transcripts/call/5")));
    }
}
