//! Mock transport for testing
//!
//! Scripts responses per (verb, path) so the data-access layer can be tested
//! without a server. Each route keeps a queue of responses; the last one
//! repeats once the queue is drained.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new()
//!     .on(Method::GET, "/calls/5", MockResponse::ok(json!({"id": 5})))
//!     .with_delay(Method::GET, "/calls/5", Duration::from_millis(50));
//!
//! let client = ApiClient::new(mock);
//! client.fetch(&Resource::get("/calls/5"), FetchOptions::default()).await?;
//! assert_eq!(client.transport().calls(Method::GET, "/calls/5"), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use super::resource::Resource;
use super::transport::{RawResponse, Transport};
use crate::error::ApiError;

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Status {
        status: u16,
        body: Value,
        retry_after: Option<Duration>,
    },
    /// Fail before any status is received
    Network(String),
}

impl MockResponse {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    /// 202 with the server's "still generating" message.
    pub fn pending() -> Self {
        Self::status(
            202,
            json!({"detail": "Insights are being generated. Please check again in a moment."}),
        )
    }

    /// Error status with a FastAPI-style detail body.
    pub fn error(status: u16, detail: &str) -> Self {
        Self::status(status, json!({ "detail": detail }))
    }

    pub fn status(status: u16, body: Value) -> Self {
        MockResponse::Status {
            status,
            body,
            retry_after: None,
        }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        MockResponse::Status {
            status: 429,
            body: json!({"detail": "Too many requests"}),
            retry_after: Some(retry_after),
        }
    }
}

#[derive(Default)]
struct Route {
    queue: VecDeque<MockResponse>,
    last: Option<MockResponse>,
    delay: Duration,
    calls: usize,
}

impl Route {
    fn next(&mut self) -> Option<MockResponse> {
        if let Some(response) = self.queue.pop_front() {
            self.last = Some(response.clone());
            return Some(response);
        }
        self.last.clone()
    }
}

/// A request observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub payload: Option<Value>,
}

/// Scripted [`Transport`] with per-route call counts and latency.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    captured: Mutex<Vec<CapturedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route (builder form of [`push`](Self::push)).
    pub fn on(self, method: Method, path: &str, response: MockResponse) -> Self {
        self.push(method, path, response);
        self
    }

    /// Delay every response on a route.
    pub fn with_delay(self, method: Method, path: &str, delay: Duration) -> Self {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .delay = delay;
        self
    }

    /// Queue a response for a route while a test is running.
    pub fn push(&self, method: Method, path: &str, response: MockResponse) {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .queue
            .push_back(response);
    }

    /// Number of requests received on a route.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        lock(&self.routes)
            .get(&(method, path.to_string()))
            .map_or(0, |route| route.calls)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.captured).len()
    }

    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        lock(&self.captured).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        resource: &Resource,
        payload: Option<&Value>,
    ) -> Result<RawResponse, ApiError> {
        lock(&self.captured).push(CapturedRequest {
            method: resource.method.clone(),
            path: resource.path.clone(),
            query: resource.query.clone(),
            payload: payload.cloned(),
        });

        let (response, delay) = {
            let mut routes = lock(&self.routes);
            let route = routes
                .entry((resource.method.clone(), resource.path.clone()))
                .or_default();
            route.calls += 1;
            (route.next(), route.delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match response.unwrap_or_else(|| MockResponse::error(404, "Not Found")) {
            MockResponse::Status {
                status,
                body,
                retry_after,
            } => Ok(RawResponse {
                status: StatusCode::from_u16(status)
                    .map_err(|e| ApiError::InvalidResponse(e.to_string()))?,
                body: serde_json::to_vec(&body).unwrap_or_default(),
                retry_after,
            }),
            MockResponse::Network(msg) => Err(ApiError::Network(msg)),
        }
    }
}
