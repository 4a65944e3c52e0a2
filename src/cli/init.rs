//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::models::CallQuery;
use crate::client::{ApiClient, CallsApi, FetchOptions, HttpTransport};
use crate::config::{AuthToken, Config};
use crate::error::Result;

/// Run the init command
///
/// Prompts for the API host and an access token copied from the web app,
/// checks the token with one small call listing, and saves both.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();

    println!("{}", "Welcome to Callwatch!".bold().green());
    println!("Let's connect to your call-analytics server.\n");

    let default_host = opts
        .api_host_ref()
        .map(str::to_string)
        .unwrap_or_else(|| config.api_host.clone());
    let api_host: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("API host")
        .default(default_host)
        .interact_text()?;

    let token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Access token")
        .interact()?;
    let token = AuthToken::new(token.trim().to_string());

    if token.is_expired() {
        println!("{}", "⚠ This token is already expired.".yellow());
    }

    println!("\n{}", "Checking access...".cyan());
    let client = ApiClient::new(HttpTransport::new(&api_host, Some(token.token.clone()))?);
    let probe = CallQuery {
        limit: 1,
        ..CallQuery::default()
    };
    let page = client.list_calls(&probe, FetchOptions::fresh()).await?;
    println!("{} Connected. {} calls visible.", "✓".green(), page.total);

    config.api_host = api_host;
    config.token = Some(token);
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "callwatch status".cyan());
    println!("  {} - List recent calls", "callwatch call list".cyan());

    Ok(())
}
