//! Call commands

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::follow;
use crate::cli::{CallFilterArgs, CommandContext, OutputFormat, PaginationArgs};
use crate::client::models::{CallCreate, CallStatus, CallUpdate, DashboardStats};
use crate::client::{CallsApi, FetchOptions};
use crate::error::{Error, Result};
use crate::models::{CallDisplay, CallSummary, InsightSummary};
use crate::output::json::format_json;
use crate::output::table::{format_record, format_table};
use crate::output::formatters::format_duration_seconds;
use crate::output::print_json;
use crate::poll::{
    CallDetailTarget, CallListSnapshot, CallListTarget, CallSnapshot, PollTarget, call_row_settled,
};

// ============================================================================
// Rendering
// ============================================================================

fn render_list(snapshot: &CallListSnapshot, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(format_json(snapshot)?);
    }

    let rows: Vec<CallDisplay> = snapshot.page.calls.iter().map(CallDisplay::from).collect();
    let mut out = format_table(&rows);

    if format == OutputFormat::Pretty {
        let page = &snapshot.page;
        if !page.calls.is_empty() {
            let first = page.skip + 1;
            let last = page.skip + page.calls.len() as u64;
            out.push_str(&format!("\nShowing {}-{} of {} calls", first, last, page.total));
        }

        let unsettled = page
            .calls
            .iter()
            .filter(|c| !call_row_settled(c, snapshot.insights.contains_key(&c.id)))
            .count();
        if unsettled > 0 {
            out.push_str(&format!(", {} not settled yet", unsettled).dimmed().to_string());
        }

        let report = &snapshot.backfill;
        if !report.patched.is_empty() {
            out.push_str(&format!("\nMeasured duration for {} call(s)", report.patched.len()));
        }
        for (call_id, reason) in &report.failed {
            out.push_str(&format!("\n{} Duration for call {}: {}", "⚠".yellow(), call_id, reason));
        }
    }
    Ok(out)
}

fn render_detail(snapshot: &CallSnapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format_json(snapshot)?),
        OutputFormat::Table => Ok(format_table(&[CallDisplay::from(&snapshot.call)])),
        OutputFormat::Pretty => {
            let mut out = CallSummary(&snapshot.call).to_string();
            let call_id = snapshot.call.id;

            match snapshot.call.status {
                CallStatus::Processing => {
                    let note = "Processing: transcript and insight not available yet";
                    out.push_str(&format!("\n{}", note.dimmed()));
                }
                CallStatus::Failed => {
                    out.push_str(&format!("\n{}", "Processing failed".red()));
                }
                CallStatus::Processed => {
                    match &snapshot.transcript {
                        Some(t) => out.push_str(&format!(
                            "\nTranscript: {} words ({})",
                            t.word_count(),
                            format!("callwatch transcript get {}", call_id).cyan()
                        )),
                        None => out.push_str(&format!("\nTranscript: {}", "generating...".dimmed())),
                    }
                    match &snapshot.insight {
                        Some(insight) => out.push_str(&format!("\n\n{}", InsightSummary(insight))),
                        None => out.push_str(&format!("\nInsight: {}", "generating...".dimmed())),
                    }
                }
            }
            Ok(out)
        }
    }
}

fn render_stats(stats: &DashboardStats, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(format_json(stats)?);
    }

    let average = if stats.processed_calls == 0 {
        "--".to_string()
    } else {
        stats.average_score.to_string()
    };
    let mut out = format_record(&[
        ("Total", stats.total_calls.to_string()),
        ("Processed", stats.processed_calls.to_string()),
        ("Processing", stats.processing_calls.to_string()),
        ("Failed", stats.failed_calls.to_string()),
        ("Avg score", average),
        (
            "Uploads",
            format!(
                "{} manual, {} from S3",
                stats.upload_method_stats.manual, stats.upload_method_stats.s3_auto
            ),
        ),
    ]);

    if !stats.recent_calls.is_empty() {
        let rows: Vec<CallDisplay> = stats.recent_calls.iter().map(CallDisplay::from).collect();
        out.push_str("\n\nRecent calls\n");
        out.push_str(&format_table(&rows));
    }
    Ok(out)
}

// ============================================================================
// Read Commands
// ============================================================================

/// List one page of calls, optionally following it until every row settles.
pub async fn list(
    opts: &GlobalOptions,
    filters: &CallFilterArgs,
    pagination: &PaginationArgs,
    watch: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = pagination.to_query(filters, ctx.config.preferences.page_size);
    debug!("Listing calls with {:?}", query);

    let target = CallListTarget::new(Arc::clone(&ctx.client), query, ctx.backfill());
    let format = ctx.format;

    if watch {
        let config = ctx.poll_config(ctx.config.preferences.list_interval(), None, None);
        let handle = ctx.poller.subscribe(target, config);
        follow(handle, format, "calls", |s| render_list(s, format)).await?;
    } else {
        let snapshot = target.fetch(FetchOptions::default()).await?;
        println!("{}", render_list(&snapshot, format)?);
    }

    ctx.log_cache_stats();
    Ok(())
}

/// Show a call once.
pub async fn get(opts: &GlobalOptions, call_id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let target = CallDetailTarget::new(Arc::clone(&ctx.client), call_id);

    let snapshot = target.fetch(FetchOptions::default()).await?;
    println!("{}", render_detail(&snapshot, ctx.format)?);

    if ctx.format == OutputFormat::Pretty && snapshot.call.status == CallStatus::Processing {
        eprintln!("\nFollow progress: {}", format!("callwatch call watch {}", call_id).cyan());
    }
    Ok(())
}

/// Show dashboard counters.
pub async fn stats(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let stats = ctx.client.call_stats(FetchOptions::default()).await?;
    println!("{}", render_stats(&stats, ctx.format)?);
    Ok(())
}

/// Follow a call until it has settled.
pub async fn watch(
    opts: &GlobalOptions,
    call_id: i64,
    interval: Option<u64>,
    max_polls: Option<u32>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let config = ctx.poll_config(ctx.config.preferences.detail_interval(), interval, max_polls);
    let format = ctx.format;

    let handle = ctx
        .poller
        .subscribe(CallDetailTarget::new(Arc::clone(&ctx.client), call_id), config);
    follow(handle, format, &format!("call {}", call_id), |s| render_detail(s, format)).await?;

    ctx.log_cache_stats();
    Ok(())
}

// ============================================================================
// Write Commands
// ============================================================================

/// Register a recording, optionally following it through processing.
pub async fn create(opts: &GlobalOptions, call: &CallCreate, watch: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let created = ctx.client.create_call(call).await?;
    debug!("Created call {} ({})", created.id, created.filename);

    if watch {
        let config = ctx.poll_config(ctx.config.preferences.detail_interval(), None, None);
        let format = ctx.format;
        let handle = ctx
            .poller
            .subscribe(CallDetailTarget::new(Arc::clone(&ctx.client), created.id), config);
        follow(handle, format, &format!("call {}", created.id), |s| render_detail(s, format))
            .await?;
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Json => print_json(&created)?,
        _ => {
            println!("{} Created call {} ({})", "✓".green(), created.id, created.filename);
            eprintln!(
                "\nFollow progress: {}",
                format!("callwatch call watch {}", created.id).cyan()
            );
        }
    }
    Ok(())
}

pub async fn update(
    opts: &GlobalOptions,
    call_id: i64,
    status: Option<CallStatus>,
    score: Option<i64>,
    duration: Option<i64>,
) -> Result<()> {
    let update = CallUpdate {
        status,
        score,
        duration,
    };
    if update.is_empty() {
        return Err(Error::Other(
            "Nothing to update. Pass --status, --score or --duration.".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts)?;
    let ack = ctx.client.update_call(call_id, &update).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&ack)?,
        _ => println!("{} {}", "✓".green(), ack.message),
    }
    Ok(())
}

pub async fn delete(opts: &GlobalOptions, call_id: i64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete call {} with its recording, transcript and insights?",
                call_id
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let ack = ctx.client.delete_call(call_id).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&ack)?,
        _ => println!("{} {}", "✓".green(), ack.message),
    }
    Ok(())
}

/// Measure one call's duration on the server.
pub async fn extract_duration(opts: &GlobalOptions, call_id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let Some(_ticket) = ctx.guard.try_acquire(call_id) else {
        return Err(Error::Other(format!(
            "Duration extraction for call {} is already running",
            call_id
        )));
    };
    let result = ctx.client.extract_duration(call_id).await?;

    if ctx.format == OutputFormat::Json {
        return print_json(&result);
    }
    if result.success {
        let duration = result
            .duration_formatted
            .clone()
            .unwrap_or_else(|| format_duration_seconds(result.duration));
        println!("{} Call {} duration: {}", "✓".green(), call_id, duration);
    } else {
        println!("{} {}", "✗".red(), result.message);
    }
    Ok(())
}
