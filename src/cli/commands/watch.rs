//! Watch Command
//!
//! Attach a poll subscription to an existing job and stream status
//! transitions until the job reaches a terminal state, the poll budget
//! runs out, or the user interrupts with Ctrl-C.

use crate::cli::ui::Output;
use crate::cli::util::{build_backend, resolve_poll_config};
use crate::config::ConfigLoader;
use crate::poll::{PollHandle, PollOutcome};
use crate::types::{JobStatus, Result, WatchError};

pub async fn run(
    job_id: &str,
    interval_ms: Option<u64>,
    max_attempts: Option<u32>,
    max_elapsed_secs: Option<u64>,
) -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let backend = build_backend(&config)?;
    let poll_config = resolve_poll_config(&config, interval_ms, max_attempts, max_elapsed_secs);

    let tracker = crate::tracker::JobTracker::new(backend, poll_config);
    let handle = tracker.watch(job_id);

    out.info(&format!("Watching job {}", handle.job_id()));
    follow(handle, &out).await
}

/// Drive a poll handle to completion, rendering every status transition.
///
/// Ctrl-C cancels the subscription; the loop then drains normally and
/// reports the cancelled outcome.
pub async fn follow(handle: PollHandle, out: &Output) -> Result<()> {
    let token = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let mut snapshots = handle.snapshots();
    let render = tokio::spawn(async move {
        let mut last_status: Option<JobStatus> = None;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                // Only print actual transitions, not every poll
                if last_status.as_ref() != Some(&snapshot.status) {
                    last_status = Some(snapshot.status.clone());
                    Output::new().snapshot(&snapshot);
                }
            }
        }
    });

    let outcome = handle.join().await?;
    render.abort();

    match outcome {
        PollOutcome::Terminal(snapshot) => {
            if snapshot.status.is_success() {
                out.success(&format!("Job {} completed", snapshot.id));
            } else {
                out.error(&format!(
                    "Job {} ended with status {}",
                    snapshot.id, snapshot.status
                ));
                if let Some(error) = &snapshot.error {
                    out.error(error);
                }
            }
            Ok(())
        }
        PollOutcome::Cancelled { last } => {
            match last {
                Some(snapshot) => out.warning(&format!(
                    "Watch cancelled; last observed status for {} was {}",
                    snapshot.id, snapshot.status
                )),
                None => out.warning("Watch cancelled before any status was observed"),
            }
            Ok(())
        }
        PollOutcome::TimedOut {
            last,
            attempts,
            elapsed,
        } => {
            if let Some(snapshot) = last {
                out.warning(&format!(
                    "Last observed status for {} was {}",
                    snapshot.id, snapshot.status
                ));
            }
            Err(WatchError::BudgetExhausted { attempts, elapsed })
        }
    }
}
