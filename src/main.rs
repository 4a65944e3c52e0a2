//! Callwatch CLI - companion for the call-analytics platform

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod poll;

use cli::args::GlobalOptions;
use cli::{CallCommands, Cli, Commands, InsightCommands, TranscriptCommands};
use client::models::CallCreate;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("callwatch version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Call(cmd) => match cmd {
            CallCommands::List {
                filters,
                pagination,
                watch,
            } => cli::call::list(&opts, &filters, &pagination, watch).await,
            CallCommands::Get { call_id } => cli::call::get(&opts, call_id).await,
            CallCommands::Stats => cli::call::stats(&opts).await,
            CallCommands::Create {
                filename,
                s3_url,
                language,
                translate,
                watch,
            } => {
                let call = CallCreate {
                    filename,
                    s3_url,
                    language,
                    translate_to_english: translate,
                };
                cli::call::create(&opts, &call, watch).await
            }
            CallCommands::Watch {
                call_id,
                interval,
                max_polls,
            } => cli::call::watch(&opts, call_id, interval, max_polls).await,
            CallCommands::Update {
                call_id,
                status,
                score,
                duration,
            } => cli::call::update(&opts, call_id, status, score, duration).await,
            CallCommands::Delete { call_id, yes } => cli::call::delete(&opts, call_id, yes).await,
            CallCommands::ExtractDuration { call_id } => {
                cli::call::extract_duration(&opts, call_id).await
            }
        },
        Commands::Transcript(TranscriptCommands::Get { call_id }) => {
            cli::transcript::get(&opts, call_id).await
        }
        Commands::Insight(cmd) => match cmd {
            InsightCommands::Get { call_id } => cli::insight::get(&opts, call_id).await,
            InsightCommands::Batch { call_ids } => cli::insight::batch(&opts, &call_ids).await,
        },
    }
}
