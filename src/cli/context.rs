//! Command execution context
//!
//! Loads configuration once and builds the process-wide pieces every command
//! shares: the API client with its cache, the extraction guard, and the
//! poller bound to the client's session.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use log::{debug, warn};

use crate::cache::ResponseCache;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{ApiClient, HttpTransport, SessionBoundary};
use crate::config::Config;
use crate::error::Result;
use crate::poll::{DurationBackfill, ExtractionGuard, PollConfig, Poller};

/// Client type used by every command.
pub type Client = ApiClient<HttpTransport>;

/// Tells the user the session is over.
struct CliBoundary;

impl SessionBoundary for CliBoundary {
    fn on_session_expired(&self) {
        eprintln!(
            "{} Session rejected by the server. Cached data cleared; run {} to set a new access token.",
            "⚠".yellow(),
            "callwatch init".cyan()
        );
    }
}

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    pub config: Config,
    pub client: Arc<Client>,
    pub guard: Arc<ExtractionGuard>,
    pub poller: Poller,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, validate the token and build the client.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or no token is configured.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let token = config.validate_auth()?.to_string();
        if config.is_token_expired() {
            warn!("Access token is expired or about to expire; run `callwatch init` if requests fail");
        }

        let api_host = opts
            .api_host_ref()
            .map(str::to_string)
            .unwrap_or_else(|| config.api_host.clone());
        debug!("Using API host {}", api_host);

        let transport = HttpTransport::new(&api_host, Some(token))?;
        let cache = Arc::new(ResponseCache::with_ttl(config.preferences.cache_ttl()));
        let client = Arc::new(
            ApiClient::new(transport)
                .with_cache(cache)
                .with_boundary(Arc::new(CliBoundary))
                .bypass_cache(opts.no_cache),
        );
        let poller = Poller::new(client.session().clone());

        Ok(Self {
            config,
            client,
            guard: Arc::new(ExtractionGuard::new()),
            poller,
            format: opts.format,
        })
    }

    /// Duration backfill sharing this context's guard.
    pub fn backfill(&self) -> DurationBackfill<Client> {
        DurationBackfill::new(Arc::clone(&self.client), Arc::clone(&self.guard))
    }

    /// Poll settings from preferences, with per-command overrides.
    pub fn poll_config(
        &self,
        default_interval: Duration,
        interval_secs: Option<u64>,
        max_polls: Option<u32>,
    ) -> PollConfig {
        let interval = interval_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(default_interval);
        PollConfig::every(interval).max_attempts(Some(
            max_polls.unwrap_or(self.config.preferences.max_poll_attempts),
        ))
    }

    /// Log cache statistics at debug level.
    pub fn log_cache_stats(&self) {
        let stats = self.client.cache_stats();
        debug!(
            "Response cache: {} entries ({} valid, {} expired, ttl {:?})",
            stats.total_entries,
            stats.valid_entries,
            stats.expired_entries,
            self.client.cache_ttl()
        );
    }
}
