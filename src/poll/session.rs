//! Poll sessions
//!
//! A session repeatedly fetches one target on a fixed interval until the
//! snapshot converges, the attempt budget runs out, the subscriber leaves, or
//! the server ends the authenticated session.
//!
//! ```text
//! Idle --subscribe--> Active --converged/exhausted--> Stopped --refresh--> Active
//!                       |                                ^
//!                       +--unsubscribe/session end-------+
//! ```
//!
//! A session holds at most one outstanding fetch. When the interval fires
//! while a fetch is still running, that fetch is dropped and replaced, so a
//! slow response can never overwrite a newer one.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use super::convergence::Convergent;
use crate::client::FetchOptions;
use crate::error::{ApiError, Result};

/// Default ceiling on fetches per session before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Something a session can poll.
#[async_trait]
pub trait PollTarget: Send + Sync + 'static {
    type Snapshot: Convergent + Clone + Send + Sync + 'static;

    /// Short label for log lines.
    fn describe(&self) -> String;

    async fn fetch(&self, options: FetchOptions) -> Result<Self::Snapshot>;
}

#[async_trait]
impl<P: PollTarget> PollTarget for Arc<P> {
    type Snapshot = P::Snapshot;

    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch(&self, options: FetchOptions) -> Result<Self::Snapshot> {
        (**self).fetch(options).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// `None` polls until convergence or unsubscribe
    pub max_attempts: Option<u32>,
}

impl PollConfig {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// Cap the fetches per armed period. The mount fetch always happens, so
    /// `Some(0)` is treated as `Some(1)`.
    pub fn max_attempts(mut self, max: Option<u32>) -> Self {
        self.max_attempts = max.map(|m| m.max(1));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    Unmounted,
    Exhausted,
    SessionEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Active,
    Stopped(StopReason),
}

impl PollPhase {
    pub fn is_stopped(&self) -> bool {
        matches!(self, PollPhase::Stopped(_))
    }
}

/// Observable state of a session.
#[derive(Debug, Clone)]
pub struct PollState<S> {
    pub phase: PollPhase,
    /// Latest successful snapshot; kept through later failures
    pub snapshot: Option<S>,
    /// Set only while no snapshot has ever been obtained
    pub error: Option<ApiError>,
    /// Fetches issued since the session was last armed
    pub ticks: u32,
    pub last_success: Option<Instant>,
}

impl<S> Default for PollState<S> {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            snapshot: None,
            error: None,
            ticks: 0,
            last_success: None,
        }
    }
}

enum PollCommand {
    Refresh,
}

/// Starts poll sessions scoped to one authenticated session.
pub struct Poller {
    session: CancellationToken,
}

impl Poller {
    /// Sessions stop with [`StopReason::SessionEnded`] when `session` is cancelled.
    pub fn new(session: CancellationToken) -> Self {
        Self { session }
    }

    /// Start polling `target`. Must be called from within a tokio runtime.
    ///
    /// The first fetch is issued immediately and skips the cache.
    pub fn subscribe<P: PollTarget>(&self, target: P, config: PollConfig) -> PollHandle<P::Snapshot> {
        let cancel = self.session.child_token();
        let (tx, rx) = watch::channel(PollState::default());
        let state = Arc::new(tx);
        let (commands, command_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            target: Arc::new(target),
            config,
            session: self.session.clone(),
            cancel: cancel.clone(),
            state: Arc::clone(&state),
            commands: command_rx,
        };
        tokio::spawn(worker.run());

        PollHandle {
            state,
            changes: rx,
            commands,
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
        }
    }
}

/// Subscription to a running session. Dropping it unsubscribes.
pub struct PollHandle<S> {
    state: Arc<watch::Sender<PollState<S>>>,
    changes: watch::Receiver<PollState<S>>,
    commands: mpsc::UnboundedSender<PollCommand>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl<S: Clone> PollHandle<S> {
    /// Stop the session now. No fetch result is applied afterwards.
    pub fn unsubscribe(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.state
            .send_modify(|s| s.phase = PollPhase::Stopped(StopReason::Unmounted));
    }

    /// Fetch again immediately, skipping the cache; re-arms a stopped session.
    ///
    /// No effect after unsubscribe or session end.
    pub fn refresh(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.commands.send(PollCommand::Refresh);
    }

    /// Receiver notified on every state change.
    pub fn changes(&self) -> watch::Receiver<PollState<S>> {
        self.changes.clone()
    }

    pub fn state(&self) -> PollState<S> {
        self.changes.borrow().clone()
    }

    /// Wait until the session reaches `Stopped`.
    pub async fn stopped(&self) -> PollState<S> {
        let mut rx = self.changes();
        match rx.wait_for(|s| s.phase.is_stopped()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

type PendingFetch<S> = Pin<Box<dyn Future<Output = Result<S>> + Send>>;

/// Resolve the outstanding fetch, or never if there is none.
async fn outstanding<S>(slot: &mut Option<PendingFetch<S>>) -> Result<S> {
    match slot {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

struct Worker<P: PollTarget> {
    target: Arc<P>,
    config: PollConfig,
    session: CancellationToken,
    cancel: CancellationToken,
    state: Arc<watch::Sender<PollState<P::Snapshot>>>,
    commands: mpsc::UnboundedReceiver<PollCommand>,
}

impl<P: PollTarget> Worker<P> {
    /// Apply a change unless the subscriber has already left.
    fn publish(&self, f: impl FnOnce(&mut PollState<P::Snapshot>)) {
        self.state.send_if_modified(|s| {
            if self.cancel.is_cancelled() {
                return false;
            }
            f(s);
            true
        });
    }

    fn cancelled_reason(&self) -> StopReason {
        if self.session.is_cancelled() {
            StopReason::SessionEnded
        } else {
            StopReason::Unmounted
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.config.max_attempts.is_some_and(|max| attempts >= max)
    }

    async fn run(mut self) {
        loop {
            let reason = self.poll_until_stopped().await;
            debug!("{}: polling stopped ({:?})", self.target.describe(), reason);

            match reason {
                StopReason::SessionEnded => {
                    self.state
                        .send_modify(|s| s.phase = PollPhase::Stopped(reason));
                    return;
                }
                StopReason::Unmounted => return,
                StopReason::Converged | StopReason::Exhausted => {
                    self.publish(|s| s.phase = PollPhase::Stopped(reason));
                }
            }

            // Stopped but still subscribed: wait for a manual refresh
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    if self.cancelled_reason() == StopReason::SessionEnded {
                        self.state
                            .send_modify(|s| s.phase = PollPhase::Stopped(StopReason::SessionEnded));
                    }
                    return;
                }
                command = self.commands.recv() => match command {
                    Some(PollCommand::Refresh) => {
                        debug!("{}: re-armed by refresh", self.target.describe());
                    }
                    None => return,
                },
            }
        }
    }

    /// One Active period: from arming until a stop condition.
    async fn poll_until_stopped(&mut self) -> StopReason {
        let mut options = FetchOptions::fresh();
        let mut attempts: u32 = 0;
        let mut in_flight: Option<PendingFetch<P::Snapshot>> = None;
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.publish(|s| {
            s.phase = PollPhase::Active;
            s.ticks = 0;
        });

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.cancelled_reason(),
                command = self.commands.recv() => match command {
                    Some(PollCommand::Refresh) => {
                        if in_flight.take().is_some() {
                            debug!("{}: fetch aborted by refresh", self.target.describe());
                        }
                        options = FetchOptions::fresh();
                        interval.reset_immediately();
                    }
                    None => return StopReason::Unmounted,
                },
                result = outstanding(&mut in_flight) => {
                    in_flight = None;
                    match result {
                        Ok(snapshot) => {
                            let converged = snapshot.is_converged();
                            self.publish(|s| {
                                s.snapshot = Some(snapshot);
                                s.error = None;
                                s.last_success = Some(Instant::now());
                            });
                            if converged {
                                return StopReason::Converged;
                            }
                        }
                        Err(err) => {
                            let err = err.into_api();
                            if err.is_auth_failure() {
                                return StopReason::SessionEnded;
                            }
                            warn!("{}: poll failed: {}", self.target.describe(), err);
                            self.publish(|s| {
                                if s.snapshot.is_none() {
                                    s.error = Some(err);
                                }
                            });
                        }
                    }
                    if self.exhausted(attempts) {
                        return StopReason::Exhausted;
                    }
                }
                _ = interval.tick() => {
                    if attempts > 0 && self.exhausted(attempts) {
                        // The last permitted fetch settles through the arm above
                        if in_flight.is_none() {
                            return StopReason::Exhausted;
                        }
                        continue;
                    }
                    if in_flight.is_some() {
                        debug!("{}: previous fetch still running, aborting it", self.target.describe());
                    }
                    attempts += 1;
                    let target = Arc::clone(&self.target);
                    let fetch_options = std::mem::take(&mut options);
                    in_flight = Some(Box::pin(async move { target.fetch(fetch_options).await }));
                    self.publish(|s| s.ticks = attempts);
                }
            }
        }
    }
}
