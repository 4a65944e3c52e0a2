//! HTTP transport
//!
//! The transport only moves bytes: it sends a [`Resource`] and hands back the
//! status, body and `Retry-After`. Classification happens in
//! [`fetcher`](super::fetcher), caching in [`ApiClient`](super::ApiClient).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

use super::rate_limit::{EndpointCategory, RateLimiterSet};
use super::resource::Resource;
use crate::error::{ApiError, Result};

/// Request timeout for every API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Unclassified response from the server.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub retry_after: Option<Duration>,
}

/// Sends requests to the API.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(
        &self,
        resource: &Resource,
        payload: Option<&Value>,
    ) -> std::result::Result<RawResponse, ApiError>;
}

/// reqwest-backed transport with bearer authentication.
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    rate_limiters: RateLimiterSet,
}

impl HttpTransport {
    /// Create a transport for `api_host` (e.g. `http://localhost:8000`).
    ///
    /// All resource paths are resolved under `<api_host>/api`.
    pub fn new(api_host: &str, token: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("callwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}/api", api_host.trim_end_matches('/')),
            token,
            rate_limiters: RateLimiterSet::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        resource: &Resource,
        payload: Option<&Value>,
    ) -> std::result::Result<RawResponse, ApiError> {
        let category = EndpointCategory::from_request(&resource.path, &resource.method);
        self.rate_limiters.wait_for(category).await;

        let url = format!("{}{}", self.base_url, resource.path);
        debug!("{} {}", resource.method, url);

        let mut request = self.http.request(resource.method.clone(), &url);
        if !resource.query.is_empty() {
            request = request.query(&resource.query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let retry_after = retry_after(response.headers());

        if status == StatusCode::TOO_MANY_REQUESTS {
            self.rate_limiters.activate(category);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;

        debug!("{} {} -> {}", resource.method, resource.path, status);
        Ok(RawResponse {
            status,
            body: body.to_vec(),
            retry_after,
        })
    }
}
