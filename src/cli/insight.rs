//! Insight commands

use colored::Colorize;
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Fetch, FetchOptions, InsightsApi};
use crate::error::Result;
use crate::models::{InsightDisplay, InsightSummary};
use crate::output::{Formattable, print_json};

/// Print a call's insight, or note that analysis is still running.
pub async fn get(opts: &GlobalOptions, call_id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    match ctx.client.get_insight(call_id, FetchOptions::default()).await? {
        Fetch::Ready(insight) => match ctx.format {
            OutputFormat::Json => print_json(&insight)?,
            OutputFormat::Table => vec![InsightDisplay::from(&insight)].print(ctx.format)?,
            OutputFormat::Pretty => println!("{}", InsightSummary(&insight)),
        },
        Fetch::Pending => {
            if ctx.format == OutputFormat::Json {
                print_json(&serde_json::json!({ "call_id": call_id, "pending": true }))?;
            } else {
                println!(
                    "Insight for call {} is still being generated. Follow it with {}",
                    call_id,
                    format!("callwatch call watch {}", call_id).cyan()
                );
            }
        }
    }
    Ok(())
}

/// Print insights for several calls fetched in one request.
pub async fn batch(opts: &GlobalOptions, call_ids: &[i64]) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let insights = ctx.client.batch_insights(call_ids, FetchOptions::default()).await?;
    debug!("Batch returned {} of {} insights", insights.len(), call_ids.len());

    if ctx.format == OutputFormat::Json {
        return print_json(&insights);
    }

    let mut rows: Vec<InsightDisplay> = insights.values().map(InsightDisplay::from).collect();
    rows.sort_by_key(|row| row.call_id);
    rows.print(ctx.format)?;

    let mut missing: Vec<i64> = call_ids
        .iter()
        .copied()
        .filter(|id| !insights.contains_key(id))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if !missing.is_empty() && ctx.format == OutputFormat::Pretty {
        let ids: Vec<String> = missing.iter().map(i64::to_string).collect();
        eprintln!("{}", format!("No insight yet for: {}", ids.join(", ")).dimmed());
    }
    Ok(())
}
