//! Error types for the Callwatch CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Callwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// The API error underneath, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Collapse into an [`ApiError`] for callers that must share or clone it.
    pub fn into_api(self) -> ApiError {
        match self {
            Error::Api(err) => err,
            other => ApiError::InvalidResponse(other.to_string()),
        }
    }
}

/// API-related errors.
///
/// `Clone` because a single deduplicated request delivers the same failure
/// to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `callwatch init` to set a new access token.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to access this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether this failure ends the authenticated session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `callwatch init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Access token not configured. Run `callwatch init` to set up your token.")]
    MissingToken,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("callwatch init"));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_api_error_forbidden_is_not_session_failure() {
        let err = ApiError::Forbidden;
        assert!(err.to_string().contains("permission"));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("Call not found".to_string());
        assert!(err.to_string().contains("Call not found"));
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_api_error_server_error() {
        let err = ApiError::ServerError("Failed to extract duration".to_string());
        assert!(err.to_string().contains("extract duration"));
    }

    #[test]
    fn test_api_error_clone_is_equal() {
        let err = ApiError::Network("Connection refused".to_string());
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_config_error_missing_token() {
        let err = ConfigError::MissingToken;
        assert!(err.to_string().contains("callwatch init"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Unauthorized.into();

        match err {
            Error::Api(ApiError::Unauthorized) => (),
            _ => panic!("Expected Error::Api(ApiError::Unauthorized)"),
        }
        let err: Error = ApiError::Forbidden.into();
        assert_eq!(err.as_api(), Some(&ApiError::Forbidden));
    }

    #[test]
    fn test_error_other_has_no_api_error() {
        let err = Error::Other("Custom error".to_string());
        assert!(err.to_string().contains("Custom error"));
        assert!(err.as_api().is_none());
        assert!(matches!(err.into_api(), ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("invalid: [yaml: content")
            .unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
