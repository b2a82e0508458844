//! Backend Client Abstraction
//!
//! Defines the JobBackend trait over the orchestration backend: job
//! submission, status fetch, and stop requests. Poll subscriptions are
//! parameterized by this trait, so tests drive them with scripted
//! in-memory backends.
//!
//! ## Modules
//!
//! - `http`: reqwest-based production client
//! - `circuit_breaker`: circuit breaker guarding the backend endpoint

pub mod circuit_breaker;
mod http;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerStats, CircuitState};
pub use http::HttpBackend;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::types::{JobId, JobKind, JobSnapshot, Result};

/// Shared backend handle for concurrent use across subscriptions.
pub type SharedBackend = Arc<dyn JobBackend + Send + Sync>;

/// Access to the remote orchestration backend
///
/// The backend owns all job state; this client only observes it. The one
/// write-shaped call, `stop`, asks the backend to cancel a job and still
/// returns an observation.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Create a job of the given kind and return its initial snapshot.
    ///
    /// On success the snapshot carries a non-empty identifier and a
    /// `pending` or `running` status. Any failure is returned to the
    /// caller; no polling may begin for a job that failed to submit.
    async fn submit(&self, kind: JobKind, params: Value) -> Result<JobSnapshot>;

    /// Fetch the current snapshot for a job.
    async fn fetch_status(&self, id: &JobId) -> Result<JobSnapshot>;

    /// Ask the backend to stop a job, returning the resulting snapshot.
    async fn stop(&self, id: &JobId) -> Result<JobSnapshot>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}
