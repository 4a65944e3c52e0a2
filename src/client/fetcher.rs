//! Response classification
//!
//! Collapses raw HTTP outcomes into three cases: data is ready, the server
//! accepted the request but is still producing the resource, or the request
//! failed. Callers never inspect status codes themselves.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::RawResponse;
use crate::error::ApiError;

/// Fallback wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Outcome of a successful request.
///
/// `Pending` means the resource is still being generated server-side (HTTP
/// 202). It is not an error and carries no data.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Ready(T),
    Pending,
}

impl<T> Fetch<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Fetch::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }

    /// The data, if ready.
    pub fn ready(self) -> Option<T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Pending => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetch<U> {
        match self {
            Fetch::Ready(value) => Fetch::Ready(f(value)),
            Fetch::Pending => Fetch::Pending,
        }
    }
}

impl Fetch<Value> {
    /// Deserialize a ready payload into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Fetch<T>, ApiError> {
        match self {
            Fetch::Ready(value) => serde_json::from_value(value)
                .map(Fetch::Ready)
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e))),
            Fetch::Pending => Ok(Fetch::Pending),
        }
    }
}

/// FastAPI error body.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Extract the human-readable reason from an error body.
///
/// Falls back to the raw body text, then to `fallback` when the body is empty.
fn detail(body: &[u8], fallback: &str) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return match parsed.detail {
            Value::String(s) => s,
            other => other.to_string(),
        };
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// Classify a raw response into ready data, pending, or a typed failure.
pub fn classify(response: RawResponse) -> Result<Fetch<Value>, ApiError> {
    let status = response.status;
    match status {
        StatusCode::ACCEPTED => {
            debug!("Resource not ready yet (202)");
            Ok(Fetch::Pending)
        }
        s if s.is_success() => {
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Fetch::Ready(Value::Null));
            }
            serde_json::from_slice(&response.body)
                .map(Fetch::Ready)
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        }
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(detail(
            &response.body,
            "Resource not found",
        ))),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimit(
            response.retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
        )),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(ApiError::BadRequest(
            detail(&response.body, "Bad request"),
        )),
        s if s.is_server_error() => Err(ApiError::ServerError(detail(
            &response.body,
            &format!("Server error: {}", s),
        ))),
        s => Err(ApiError::InvalidResponse(format!(
            "Unexpected status code: {}",
            s
        ))),
    }
}
