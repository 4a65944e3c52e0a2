//! Configuration management for Callwatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::token::jwt_expiry;
use crate::error::{ConfigError, Result};

/// API host used when nothing else is configured.
pub const DEFAULT_API_HOST: &str = "http://localhost:8000";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the call-analytics server (without `/api`)
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Access token from the web login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<AuthToken>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

/// Access token with its expiry, when the token carries one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Wrap a raw token, reading the expiry from it if it is a JWT.
    pub fn new(token: String) -> Self {
        let expires_at = jwt_expiry(&token).ok();
        Self { token, expires_at }
    }

    /// Expired, or expiring within five minutes.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => expires_at - chrono::Duration::minutes(5) < Utc::now(),
        }
    }
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default page size for call listings
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Response cache TTL in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Poll interval for a single call
    #[serde(default = "default_detail_poll_secs")]
    pub detail_poll_secs: u64,

    /// Poll interval for call listings
    #[serde(default = "default_list_poll_secs")]
    pub list_poll_secs: u64,

    /// Ticks before a watch gives up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_page_size() -> u32 {
    50
}

fn default_cache_ttl_ms() -> u64 {
    crate::cache::DEFAULT_TTL.as_millis() as u64
}

fn default_detail_poll_secs() -> u64 {
    crate::poll::DETAIL_INTERVAL.as_secs()
}

fn default_list_poll_secs() -> u64 {
    crate::poll::LIST_INTERVAL.as_secs()
}

fn default_max_poll_attempts() -> u32 {
    crate::poll::DEFAULT_MAX_ATTEMPTS
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_ttl_ms: default_cache_ttl_ms(),
            detail_poll_secs: default_detail_poll_secs(),
            list_poll_secs: default_list_poll_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Preferences {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn detail_interval(&self) -> Duration {
        Duration::from_secs(self.detail_poll_secs.max(1))
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_secs(self.list_poll_secs.max(1))
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".callwatch").join("config.yaml"))
    }

    /// `--config` path if given, otherwise the default location.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path` or the default location
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to `path` or the default location
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Token inside: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// The configured token, or an error pointing at `callwatch init`.
    pub fn validate_auth(&self) -> Result<&str> {
        match &self.token {
            Some(token) if !token.token.trim().is_empty() => Ok(&token.token),
            _ => Err(ConfigError::MissingToken.into()),
        }
    }

    pub fn is_token_expired(&self) -> bool {
        self.token.as_ref().is_some_and(AuthToken::is_expired)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            token: None,
            preferences: Preferences::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::token::make_jwt;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert!(config.token.is_none());
        assert_eq!(config.preferences.page_size, 50);
        assert_eq!(config.preferences.cache_ttl(), Duration::from_millis(5000));
        assert_eq!(config.preferences.detail_interval(), Duration::from_secs(3));
        assert_eq!(config.preferences.list_interval(), Duration::from_secs(10));
        assert_eq!(config.preferences.max_poll_attempts, 200);
    }

    #[test]
    fn test_partial_preferences_use_defaults() {
        let config: Config =
            serde_yaml::from_str("api_host: http://calls.internal\npreferences:\n  list_poll_secs: 30\n")
                .unwrap();

        assert_eq!(config.api_host, "http://calls.internal");
        assert_eq!(config.preferences.list_poll_secs, 30);
        assert_eq!(config.preferences.cache_ttl_ms, 5000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.token = Some(AuthToken::new("opaque-token".to_string()));

        config.save_to(path.clone()).unwrap();
        let loaded = Config::load_from(path.clone()).unwrap();

        assert_eq!(loaded.validate_auth().unwrap(), "opaque-token");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load_from(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("callwatch init"));
    }

    #[test]
    fn test_validate_auth_requires_token() {
        let mut config = Config::default();
        assert!(config.validate_auth().is_err());

        config.token = Some(AuthToken::new("  ".to_string()));
        assert!(config.validate_auth().is_err());
    }

    #[test]
    fn test_token_expiry() {
        // Opaque tokens never look expired
        assert!(!AuthToken::new("opaque".to_string()).is_expired());

        let expired = AuthToken::new(make_jwt((Utc::now() - chrono::Duration::hours(1)).timestamp()));
        assert!(expired.expires_at.is_some());
        assert!(expired.is_expired());

        let soon = AuthToken::new(make_jwt((Utc::now() + chrono::Duration::minutes(2)).timestamp()));
        assert!(soon.is_expired());

        let valid = AuthToken::new(make_jwt((Utc::now() + chrono::Duration::hours(1)).timestamp()));
        assert!(!valid.is_expired());
    }
}
