//! Submit Command
//!
//! Submit a new job to the orchestration backend. With `--watch` the
//! command stays attached and streams status transitions until the job
//! finishes; without it, submission prints the assigned identifier and
//! returns immediately.

use serde_json::Value;

use crate::cli::ui::Output;
use crate::cli::util::{build_backend, resolve_poll_config};
use crate::client::JobBackend;
use crate::config::ConfigLoader;
use crate::tracker::JobTracker;
use crate::types::{JobKind, Result, WatchError};

pub async fn run(
    kind: JobKind,
    params: Option<&str>,
    watch: bool,
    interval_ms: Option<u64>,
    max_attempts: Option<u32>,
    max_elapsed_secs: Option<u64>,
) -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let backend = build_backend(&config)?;

    // Malformed parameters fail the submission up front, before any
    // request is sent.
    let params: Value = match params {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| WatchError::submit(kind.to_string(), format!("invalid params: {}", e)))?,
        None => Value::Object(serde_json::Map::new()),
    };

    if watch {
        let poll_config = resolve_poll_config(&config, interval_ms, max_attempts, max_elapsed_secs);
        let tracker = JobTracker::new(backend, poll_config);
        let handle = tracker.submit_and_watch(kind, params).await?;

        out.success(&format!("Submitted {} job {}", kind, handle.job_id()));
        super::watch::follow(handle, &out).await
    } else {
        let snapshot = backend.submit(kind, params).await?;
        out.success(&format!("Submitted {} job {}", kind, snapshot.id));
        out.info(&format!("Track it with: jobwatch watch {}", snapshot.id));
        Ok(())
    }
}
