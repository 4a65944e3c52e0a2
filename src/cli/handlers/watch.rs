//! Watch loop shared by `call watch` and `call list --watch`
//!
//! Renders every new snapshot a poll session publishes until the session
//! stops. Ctrl-C unsubscribes; the loop then sees `Stopped(Unmounted)` and
//! returns normally.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::OutputFormat;
use crate::error::{ApiError, Result};
use crate::poll::{PollHandle, PollPhase, PollState, StopReason};

fn spinner(format: OutputFormat) -> Option<ProgressBar> {
    if format != OutputFormat::Pretty {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    Some(bar)
}

fn print_above(bar: Option<&ProgressBar>, text: &str) {
    match bar {
        Some(bar) => bar.suspend(|| println!("{}", text)),
        None => println!("{}", text),
    }
}

/// Follow a poll session, printing each distinct rendering of its snapshot.
///
/// Returns the final state. An error is returned when the session ended
/// without ever producing a snapshot, or when the server rejected the token.
pub async fn follow<S, F>(
    handle: PollHandle<S>,
    format: OutputFormat,
    what: &str,
    render: F,
) -> Result<PollState<S>>
where
    S: Clone,
    F: Fn(&S) -> Result<String>,
{
    let mut changes = handle.changes();
    let bar = spinner(format);
    let mut last_rendered: Option<String> = None;

    let state = loop {
        let state = changes.borrow_and_update().clone();

        if let Some(snapshot) = &state.snapshot {
            let rendered = render(snapshot)?;
            if last_rendered.as_deref() != Some(rendered.as_str()) {
                print_above(bar.as_ref(), &rendered);
                last_rendered = Some(rendered);
            }
        }

        if let Some(bar) = &bar {
            let msg = match (&state.phase, &state.error) {
                (_, Some(err)) => format!("Watching {} (last poll failed: {})", what, err),
                _ => format!("Watching {} (poll {})", what, state.ticks),
            };
            bar.set_message(msg);
        }

        if state.phase.is_stopped() {
            break state;
        }

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break handle.state();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, unsubscribing from {}", what);
                handle.unsubscribe();
            }
        }
    };

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    match state.phase {
        PollPhase::Stopped(StopReason::SessionEnded) => return Err(ApiError::Unauthorized.into()),
        PollPhase::Stopped(StopReason::Exhausted) => eprintln!(
            "{} Stopped watching {} after {} polls; it has not settled yet.",
            "⚠".yellow(),
            what,
            state.ticks
        ),
        PollPhase::Stopped(StopReason::Converged) if format == OutputFormat::Pretty => {
            eprintln!("{} {} has settled.", "✓".green(), what)
        }
        _ => {}
    }

    match (&state.snapshot, &state.error) {
        (None, Some(err)) => Err(err.clone().into()),
        _ => Ok(state),
    }
}
