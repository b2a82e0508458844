//! Job Tracker
//!
//! Glue between submission and polling. The tracker owns the backend
//! handle and a registry of live subscriptions, so that stopping a job
//! always tears down its client-side poller as well — a stop request
//! must never leave an orphaned loop fetching a job that will not reach
//! the state it is waiting for.

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::client::SharedBackend;
use crate::poll::{CancelToken, PollConfig, PollHandle, PollSubscription};
use crate::types::{JobId, JobKind, JobSnapshot, Result, WatchError};

struct SubscriptionEntry {
    token: CancelToken,
    snapshots: watch::Receiver<Option<JobSnapshot>>,
}

/// Submits jobs and manages their poll subscriptions
pub struct JobTracker {
    backend: SharedBackend,
    poll_config: PollConfig,
    subscriptions: DashMap<JobId, SubscriptionEntry>,
}

impl JobTracker {
    pub fn new(backend: SharedBackend, poll_config: PollConfig) -> Self {
        Self {
            backend,
            poll_config,
            subscriptions: DashMap::new(),
        }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Submit a job and start polling it.
    ///
    /// On any submission failure the error is returned and no subscription
    /// exists; nothing will ever poll a job that was not accepted.
    pub async fn submit_and_watch(&self, kind: JobKind, params: Value) -> Result<PollHandle> {
        let seed = self
            .backend
            .submit(kind, params)
            .await
            .map_err(|e| WatchError::submit(kind.to_string(), e.to_string()))?;

        info!(job_id = %seed.id, kind = %kind, status = %seed.status, "Job submitted, starting watch");
        Ok(self.attach(seed.id.clone(), Some(seed)))
    }

    /// Start polling an already-submitted job.
    pub fn watch(&self, id: impl Into<JobId>) -> PollHandle {
        let id = id.into();
        debug!(job_id = %id, "Attaching watch to existing job");
        self.attach(id, None)
    }

    fn attach(&self, id: JobId, seed: Option<JobSnapshot>) -> PollHandle {
        let mut subscription =
            PollSubscription::new(id.clone(), self.backend.clone(), self.poll_config.clone());
        if let Some(seed) = seed {
            subscription = subscription.with_seed(seed);
        }

        self.subscriptions.insert(
            id,
            SubscriptionEntry {
                token: subscription.cancel_token(),
                snapshots: subscription.snapshots(),
            },
        );

        subscription.spawn()
    }

    /// Latest snapshot observed by a live subscription.
    pub fn latest(&self, id: &JobId) -> Result<Option<JobSnapshot>> {
        self.subscriptions
            .get(id)
            .map(|entry| entry.snapshots.borrow().clone())
            .ok_or_else(|| WatchError::NotSubscribed(id.to_string()))
    }

    /// Whether a subscription is registered for this job.
    pub fn is_watching(&self, id: &JobId) -> bool {
        self.subscriptions.contains_key(id)
    }

    /// Stop a job on the backend and tear down its poller.
    ///
    /// The local poller is cancelled first and unconditionally: even if
    /// the remote stop fails, no loop keeps fetching a job the user gave
    /// up on.
    pub async fn cancel(&self, id: &JobId) -> Result<JobSnapshot> {
        if let Some((_, entry)) = self.subscriptions.remove(id) {
            entry.token.cancel();
            debug!(job_id = %id, "Local poller cancelled");
        }

        self.backend.stop(id).await
    }

    /// Drop the registry entry for a finished watch.
    pub fn release(&self, id: &JobId) {
        self.subscriptions.remove(id);
    }

    /// Cancel every live subscription without touching remote jobs.
    /// Used on shutdown; the jobs themselves keep running.
    pub fn detach_all(&self) {
        for entry in self.subscriptions.iter() {
            entry.value().token.cancel();
        }
        let detached = self.subscriptions.len();
        self.subscriptions.clear();
        if detached > 0 {
            info!(count = detached, "Detached all subscriptions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::JobBackend;
    use crate::poll::{PollBudget, PollOutcome};
    use crate::types::{ErrorCategory, FetchError, JobStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Backend with a scripted submit result, scripted fetches, and a
    /// stop-call counter.
    struct MockBackend {
        submit_result: Mutex<Option<Result<JobSnapshot>>>,
        fetch_script: Mutex<VecDeque<Result<JobSnapshot>>>,
        fetches: AtomicU32,
        stops: AtomicU32,
        stop_fails: bool,
    }

    impl MockBackend {
        fn new(
            submit_result: Result<JobSnapshot>,
            fetch_script: Vec<Result<JobSnapshot>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                submit_result: Mutex::new(Some(submit_result)),
                fetch_script: Mutex::new(fetch_script.into_iter().collect()),
                fetches: AtomicU32::new(0),
                stops: AtomicU32::new(0),
                stop_fails: false,
            })
        }

        fn with_failing_stop(submit_result: Result<JobSnapshot>) -> Arc<Self> {
            Arc::new(Self {
                submit_result: Mutex::new(Some(submit_result)),
                fetch_script: Mutex::new(VecDeque::new()),
                fetches: AtomicU32::new(0),
                stops: AtomicU32::new(0),
                stop_fails: true,
            })
        }
    }

    #[async_trait]
    impl JobBackend for MockBackend {
        async fn submit(&self, _kind: JobKind, _params: Value) -> Result<JobSnapshot> {
            self.submit_result
                .lock()
                .unwrap()
                .take()
                .expect("submit called twice")
        }

        async fn fetch_status(&self, _id: &JobId) -> Result<JobSnapshot> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let next = self.fetch_script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| {
                Err(FetchError::new(ErrorCategory::Unavailable, "script exhausted").into())
            })
        }

        async fn stop(&self, id: &JobId) -> Result<JobSnapshot> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.stop_fails {
                Err(FetchError::new(ErrorCategory::Transient, "stop failed").into())
            } else {
                Ok(JobSnapshot::new(id.as_str(), JobStatus::Cancelled))
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn poll_config() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(2000),
            fetch_timeout: Duration::from_secs(30),
            budget: PollBudget::unbounded(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_creates_no_subscription() {
        let backend = MockBackend::new(
            Err(FetchError::new(ErrorCategory::BadRequest, "invalid params").into()),
            vec![],
        );
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let result = tracker
            .submit_and_watch(JobKind::WorkflowExecution, json!({}))
            .await;

        assert!(matches!(result, Err(WatchError::Submit { .. })));
        assert!(tracker.subscriptions.is_empty());
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_and_watch_to_completion() {
        let backend = MockBackend::new(
            Ok(JobSnapshot::new("wf-1", JobStatus::Pending)),
            vec![
                Ok(JobSnapshot::new("wf-1", JobStatus::Running)),
                Ok(JobSnapshot::new("wf-1", JobStatus::Completed)),
            ],
        );
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let handle = tracker
            .submit_and_watch(JobKind::WorkflowExecution, json!({"workflow_id": 1}))
            .await
            .unwrap();
        let id = handle.job_id().clone();
        assert!(tracker.is_watching(&id));

        let outcome = handle.join().await.unwrap();
        assert!(outcome.is_terminal());
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 2);

        tracker.release(&id);
        assert!(!tracker.is_watching(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_remote_and_local() {
        let backend = MockBackend::new(
            Ok(JobSnapshot::new("wf-2", JobStatus::Running)),
            vec![
                Ok(JobSnapshot::new("wf-2", JobStatus::Running)),
                Ok(JobSnapshot::new("wf-2", JobStatus::Running)),
            ],
        );
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let handle = tracker
            .submit_and_watch(JobKind::DebateSession, json!({}))
            .await
            .unwrap();
        let id = handle.job_id().clone();

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let snapshot = tracker.cancel(&id).await.unwrap();
        assert_eq!(snapshot.status, JobStatus::Cancelled);
        assert_eq!(backend.stops.load(Ordering::SeqCst), 1);
        assert!(!tracker.is_watching(&id));

        let outcome = handle.join().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_tears_down_poller_even_if_stop_fails() {
        let backend =
            MockBackend::with_failing_stop(Ok(JobSnapshot::new("wf-3", JobStatus::Running)));
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let handle = tracker
            .submit_and_watch(JobKind::EvaluationBatch, json!({}))
            .await
            .unwrap();
        let id = handle.job_id().clone();

        let result = tracker.cancel(&id).await;
        assert!(result.is_err());

        // The remote stop failed, but the local poller is gone.
        let outcome = handle.join().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
        assert!(!tracker.is_watching(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_reflects_watch_channel() {
        let backend = MockBackend::new(
            Ok(JobSnapshot::new("wf-4", JobStatus::Pending)),
            vec![Ok(JobSnapshot::new("wf-4", JobStatus::Running))],
        );
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let handle = tracker
            .submit_and_watch(JobKind::WorkflowExecution, json!({}))
            .await
            .unwrap();
        let id = handle.job_id().clone();

        // Seed is visible before any fetch.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let latest = tracker.latest(&id).unwrap().unwrap();
        assert_eq!(latest.status, JobStatus::Pending);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let latest = tracker.latest(&id).unwrap().unwrap();
        assert_eq!(latest.status, JobStatus::Running);

        handle.cancel();
        let _ = handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_for_unknown_job() {
        let backend = MockBackend::new(Ok(JobSnapshot::new("x", JobStatus::Pending)), vec![]);
        let tracker = JobTracker::new(backend, poll_config());

        let result = tracker.latest(&JobId::new("nope"));
        assert!(matches!(result, Err(WatchError::NotSubscribed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_all_cancels_without_remote_stop() {
        let backend = MockBackend::new(
            Ok(JobSnapshot::new("wf-5", JobStatus::Running)),
            vec![Ok(JobSnapshot::new("wf-5", JobStatus::Running))],
        );
        let tracker = JobTracker::new(backend.clone(), poll_config());

        let handle = tracker
            .submit_and_watch(JobKind::WorkflowExecution, json!({}))
            .await
            .unwrap();

        tracker.detach_all();
        assert!(tracker.subscriptions.is_empty());
        assert_eq!(backend.stops.load(Ordering::SeqCst), 0);

        let outcome = handle.join().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
    }
}
