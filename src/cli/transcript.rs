//! Transcript commands

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Fetch, FetchOptions, TranscriptsApi};
use crate::error::Result;
use crate::models::TranscriptSummary;
use crate::output::print_json;

/// Print a call's transcript, or note that it is still being generated.
pub async fn get(opts: &GlobalOptions, call_id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    match ctx.client.get_transcript(call_id, FetchOptions::default()).await? {
        Fetch::Ready(transcript) => match ctx.format {
            OutputFormat::Json => print_json(&transcript)?,
            _ => println!("{}", TranscriptSummary(&transcript)),
        },
        Fetch::Pending => {
            if ctx.format == OutputFormat::Json {
                print_json(&serde_json::json!({ "call_id": call_id, "pending": true }))?;
            } else {
                println!(
                    "Transcript for call {} is still being generated. Follow it with {}",
                    call_id,
                    format!("callwatch call watch {}", call_id).cyan()
                );
            }
        }
    }
    Ok(())
}
