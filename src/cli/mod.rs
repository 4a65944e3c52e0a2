//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

use crate::client::models::CallStatus;

pub mod args;
pub mod call;
pub mod context;
pub mod handlers;
pub mod init;
pub mod insight;
pub mod status;
pub mod transcript;

pub use args::{CallFilterArgs, OutputFormat, PaginationArgs};
pub use context::CommandContext;

/// Callwatch CLI - companion for the call-analytics platform
#[derive(Parser, Debug)]
#[command(name = "callwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "CALLWATCH_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "CALLWATCH_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the API host from the config file
    #[arg(long, global = true, env = "CALLWATCH_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "CALLWATCH_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the response cache, fetch fresh data from the API
    #[arg(long, global = true, env = "CALLWATCH_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set the API host and access token
    Init,

    /// Show configuration and token status
    Status,

    /// Display version information
    Version,

    /// List, inspect, watch and manage calls
    #[command(subcommand)]
    Call(CallCommands),

    /// Read call transcripts
    #[command(subcommand)]
    Transcript(TranscriptCommands),

    /// Read call insights
    #[command(subcommand)]
    Insight(InsightCommands),
}

/// Call subcommands
#[derive(Subcommand, Debug)]
pub enum CallCommands {
    /// List calls
    List {
        #[command(flatten)]
        filters: CallFilterArgs,

        #[command(flatten)]
        pagination: PaginationArgs,

        /// Keep refreshing until every listed call has settled
        #[arg(long, short = 'w')]
        watch: bool,
    },

    /// Show a call with its transcript and insight status
    Get {
        /// Call ID
        call_id: i64,
    },

    /// Show dashboard counters
    Stats,

    /// Register a recording already stored in S3
    Create {
        /// Recording file name
        #[arg(long)]
        filename: String,

        /// S3 URL or object key of the recording
        #[arg(long)]
        s3_url: String,

        /// Spoken language code (auto-detected when omitted)
        #[arg(long)]
        language: Option<String>,

        /// Translate the transcript to English before analysis
        #[arg(long)]
        translate: bool,

        /// Follow the new call until processing finishes
        #[arg(long, short = 'w')]
        watch: bool,
    },

    /// Follow a call until processing finishes
    Watch {
        /// Call ID
        call_id: i64,

        /// Seconds between polls (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,

        /// Give up after this many polls
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_polls: Option<u32>,
    },

    /// Update status, score or duration
    Update {
        /// Call ID
        call_id: i64,

        /// New status (processing, processed, failed)
        #[arg(long)]
        status: Option<CallStatus>,

        /// New overall score (0-100)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=100))]
        score: Option<i64>,

        /// New duration in seconds
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        duration: Option<i64>,
    },

    /// Delete a call, its recording, transcript and insights
    Delete {
        /// Call ID
        call_id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Ask the server to measure the recording length
    ExtractDuration {
        /// Call ID
        call_id: i64,
    },
}

/// Transcript subcommands
#[derive(Subcommand, Debug)]
pub enum TranscriptCommands {
    /// Show the transcript for a call
    Get {
        /// Call ID
        call_id: i64,
    },
}

/// Insight subcommands
#[derive(Subcommand, Debug)]
pub enum InsightCommands {
    /// Show the insight for a call
    Get {
        /// Call ID
        call_id: i64,
    },

    /// Show insights for several calls in one request
    Batch {
        /// Call IDs (space or comma separated)
        #[arg(required = true, value_delimiter = ',')]
        call_ids: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call_watch() {
        let cli = Cli::try_parse_from([
            "callwatch", "call", "watch", "12", "--interval", "2", "--max-polls", "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Call(CallCommands::Watch {
                call_id,
                interval,
                max_polls,
            }) => {
                assert_eq!(call_id, 12);
                assert_eq!(interval, Some(2));
                assert_eq!(max_polls, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_insight_batch_comma_list() {
        let cli = Cli::try_parse_from(["callwatch", "insight", "batch", "3,1", "7"]).unwrap();

        match cli.command {
            Commands::Insight(InsightCommands::Batch { call_ids }) => {
                assert_eq!(call_ids, vec![3, 1, 7]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_update_score_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["callwatch", "call", "update", "1", "--score", "140"]).is_err());
    }

    #[test]
    fn test_zero_max_polls_rejected() {
        assert!(Cli::try_parse_from(["callwatch", "call", "watch", "1", "--max-polls", "0"]).is_err());
    }

    #[test]
    fn test_parse_call_create() {
        let cli = Cli::try_parse_from([
            "callwatch", "call", "create", "--filename", "a.mp3", "--s3-url", "s3://b/a.mp3",
            "--translate",
        ])
        .unwrap();

        match cli.command {
            Commands::Call(CallCommands::Create {
                filename,
                language,
                translate,
                watch,
                ..
            }) => {
                assert_eq!(filename, "a.mp3");
                assert_eq!(language, None);
                assert!(translate);
                assert!(!watch);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
