//! Poll Subscription
//!
//! The single owner of the poll-until-terminal loop. A subscription ties a
//! job identifier to a fixed polling cadence, a terminal-state classifier,
//! and a cancellation token, so callers never assemble timer chains by
//! hand.
//!
//! ## Guarantees
//!
//! - Poll N+1 starts only after poll N resolves; a subscription never
//!   races against itself.
//! - Once a terminal status is observed, no further fetch is issued.
//! - Cancellation is idempotent and suppresses any fetch that was already
//!   scheduled but not yet issued.
//! - A failed fetch leaves the last-known snapshot untouched and the loop
//!   continues on its existing interval.
//! - Observers see exactly the last successfully fetched snapshot, in
//!   order, via a watch channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::budget::PollBudget;
use super::terminal::{StandardClassifier, TerminalClassifier};
use crate::client::SharedBackend;
use crate::config::PollSettings;
use crate::constants::poll as poll_constants;
use crate::types::{JobId, JobSnapshot, Result, WatchError};

// =============================================================================
// Poll Configuration
// =============================================================================

/// Cadence and budget for one subscription
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed interval between fetches
    pub interval: Duration,
    /// Timeout applied to each individual fetch
    pub fetch_timeout: Duration,
    /// Lifetime budget
    pub budget: PollBudget,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(poll_constants::DEFAULT_INTERVAL_MS),
            fetch_timeout: Duration::from_secs(poll_constants::FETCH_TIMEOUT_SECS),
            budget: PollBudget::default(),
        }
    }
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        Self {
            interval: Duration::from_millis(settings.interval_ms),
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            budget: PollBudget::from(settings),
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable, thread-safe cancellation handle
///
/// Cancelling is one-way and idempotent: once set, the flag never clears
/// and repeated calls are no-ops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of
    /// times, including while a fetch is in flight.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve when cancellation is requested
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a cancel between
        // the check and the await cannot be missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// How a subscription ended
#[derive(Debug)]
pub enum PollOutcome {
    /// A terminal status was observed
    Terminal(JobSnapshot),
    /// The subscription was cancelled before a terminal status
    Cancelled { last: Option<JobSnapshot> },
    /// The poll budget ran out before a terminal status
    TimedOut {
        last: Option<JobSnapshot>,
        attempts: u32,
        elapsed: Duration,
    },
}

impl PollOutcome {
    /// The last snapshot observed, however the subscription ended
    pub fn last_snapshot(&self) -> Option<&JobSnapshot> {
        match self {
            Self::Terminal(snap) => Some(snap),
            Self::Cancelled { last } | Self::TimedOut { last, .. } => last.as_ref(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// One poll-until-terminal loop for one job
pub struct PollSubscription {
    job_id: JobId,
    backend: SharedBackend,
    classifier: Arc<dyn TerminalClassifier>,
    config: PollConfig,
    token: CancelToken,
    seed: Option<JobSnapshot>,
    snapshot_tx: watch::Sender<Option<JobSnapshot>>,
    snapshot_rx: watch::Receiver<Option<JobSnapshot>>,
}

impl PollSubscription {
    pub fn new(job_id: impl Into<JobId>, backend: SharedBackend, config: PollConfig) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        Self {
            job_id: job_id.into(),
            backend,
            classifier: Arc::new(StandardClassifier),
            config,
            token: CancelToken::new(),
            seed: None,
            snapshot_tx,
            snapshot_rx,
        }
    }

    /// Replace the terminal-state predicate
    pub fn with_classifier(mut self, classifier: impl TerminalClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Seed the subscription with the snapshot the submit call returned,
    /// so observers see it before the first fetch lands. A seed that is
    /// already terminal ends the subscription without any fetch.
    pub fn with_seed(mut self, snapshot: JobSnapshot) -> Self {
        self.seed = Some(snapshot);
        self
    }

    /// Handle observers use to request cancellation
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Channel carrying the latest successfully fetched snapshot
    pub fn snapshots(&self) -> watch::Receiver<Option<JobSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Spawn the loop onto the runtime and return a handle to it
    pub fn spawn(self) -> PollHandle {
        let job_id = self.job_id.clone();
        let token = self.token.clone();
        let snapshots = self.snapshots();
        let join = tokio::spawn(self.run());
        PollHandle {
            job_id,
            token,
            snapshots,
            join,
        }
    }

    /// Drive the loop to completion
    ///
    /// The loop is strictly sequential: one fetch at a time, one interval
    /// between fetches, re-checking cancellation and budget before every
    /// fetch.
    pub async fn run(self) -> PollOutcome {
        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut last: Option<JobSnapshot> = None;

        if let Some(seed) = self.seed.clone() {
            let terminal = self.classifier.is_terminal(&seed.status);
            self.snapshot_tx.send_replace(Some(seed.clone()));
            if terminal {
                debug!(job_id = %self.job_id, status = %seed.status, "Seed snapshot already terminal");
                return PollOutcome::Terminal(seed);
            }
            last = Some(seed);
        }

        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    info!(job_id = %self.job_id, "Subscription cancelled");
                    return PollOutcome::Cancelled { last };
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            // The cancel may have landed in the same instant the timer
            // fired; a cancelled subscription must not issue the fetch it
            // had scheduled.
            if self.token.is_cancelled() {
                info!(job_id = %self.job_id, "Subscription cancelled");
                return PollOutcome::Cancelled { last };
            }

            let elapsed = started.elapsed();
            if self.config.budget.is_exhausted(attempts, elapsed) {
                warn!(
                    job_id = %self.job_id,
                    attempts,
                    ?elapsed,
                    "Poll budget exhausted before terminal state"
                );
                return PollOutcome::TimedOut {
                    last,
                    attempts,
                    elapsed,
                };
            }

            attempts += 1;
            match self.fetch_once().await {
                Ok(snapshot) => {
                    debug!(
                        job_id = %self.job_id,
                        status = %snapshot.status,
                        attempt = attempts,
                        "Fetched job status"
                    );
                    let terminal = self.classifier.is_terminal(&snapshot.status);
                    self.snapshot_tx.send_replace(Some(snapshot.clone()));

                    if terminal {
                        info!(
                            job_id = %self.job_id,
                            status = %snapshot.status,
                            attempts,
                            "Job reached terminal state"
                        );
                        return PollOutcome::Terminal(snapshot);
                    }
                    last = Some(snapshot);
                }
                Err(err) => {
                    // Last-known snapshot stays as-is; the loop continues
                    // on its existing interval.
                    warn!(
                        job_id = %self.job_id,
                        attempt = attempts,
                        error = %err,
                        "Status fetch failed; keeping last-known snapshot"
                    );
                }
            }
        }
    }

    /// One fetch, bounded by the per-fetch timeout and abandoned on cancel
    async fn fetch_once(&self) -> Result<JobSnapshot> {
        let fetch = tokio::time::timeout(
            self.config.fetch_timeout,
            self.backend.fetch_status(&self.job_id),
        );

        tokio::select! {
            _ = self.token.cancelled() => {
                Err(WatchError::timeout("fetch abandoned on cancel", Duration::ZERO))
            }
            res = fetch => match res {
                Ok(inner) => inner,
                Err(_) => Err(WatchError::timeout("status fetch", self.config.fetch_timeout)),
            },
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Handle to a spawned subscription
pub struct PollHandle {
    job_id: JobId,
    token: CancelToken,
    snapshots: watch::Receiver<Option<JobSnapshot>>,
    join: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Request cancellation (idempotent)
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Channel carrying the latest successfully fetched snapshot
    pub fn snapshots(&self) -> watch::Receiver<Option<JobSnapshot>> {
        self.snapshots.clone()
    }

    /// Wait for the loop to finish
    pub async fn join(self) -> Result<PollOutcome> {
        self.join
            .await
            .map_err(|e| WatchError::Subscription(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
