//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Callwatch Configuration Status".bold());

    let config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "callwatch init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    match opts.api_host_ref() {
        Some(host) => println!("{} API host: {} (from --api-host)", "○".dimmed(), host.cyan()),
        None => println!("{} API host: {}", "✓".green(), config.api_host.cyan()),
    }

    match &config.token {
        None => {
            println!("{} Access token not configured", "✗".red());
            println!("  → Run 'callwatch init' to configure");
        }
        Some(token) => match token.expires_at {
            None => println!("{} Access token configured (no expiry claim)", "✓".green()),
            Some(_) if token.is_expired() => {
                println!("{} Access token expired", "⚠".yellow());
                println!("  → Run 'callwatch init' with a new token");
            }
            Some(expires) => {
                let remaining = expires.signed_duration_since(chrono::Utc::now());
                println!(
                    "{} Access token valid (expires in {}h {}m)",
                    "✓".green(),
                    remaining.num_hours(),
                    remaining.num_minutes() % 60
                );
            }
        },
    }

    let prefs = &config.preferences;
    println!();
    println!(
        "Cache TTL: {} ms | Poll: call {}s, list {}s | Max polls: {} | Page size: {}",
        prefs.cache_ttl_ms,
        prefs.detail_poll_secs,
        prefs.list_poll_secs,
        prefs.max_poll_attempts,
        prefs.page_size
    );
    if opts.no_cache {
        println!("{} Response cache disabled (--no-cache)", "○".dimmed());
    }
    println!();

    Ok(())
}
