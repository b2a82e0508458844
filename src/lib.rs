//! JobWatch - Orchestration Job Submission and Status Tracking
//!
//! A client library and CLI for submitting long-running jobs to an
//! orchestration backend and polling them to completion. The backend
//! executes jobs asynchronously; this crate owns the client side of the
//! lifecycle: submit, poll on a fixed interval, classify terminal states,
//! and tear the subscription down exactly once.
//!
//! ## Core Features
//!
//! - **Poll Subscriptions**: one sequential poll loop per watched job,
//!   publishing snapshots over a watch channel
//! - **Explicit Budgets**: attempt and elapsed-time caps with a distinct
//!   timed-out outcome, never an infinite silent loop
//! - **Cancellation**: idempotent cancel tokens that stop the poller even
//!   when the remote stop request fails
//! - **Circuit Breaker**: per-endpoint breaker so a dead backend is not
//!   hammered on every tick
//!
//! ## Quick Start
//!
//! ```ignore
//! use jobwatch::{JobKind, JobTracker, PollConfig};
//!
//! let tracker = JobTracker::new(backend, PollConfig::default());
//! let handle = tracker.submit_and_watch(JobKind::EvaluationBatch, params).await?;
//! let outcome = handle.join().await?;
//! ```
//!
//! ## Modules
//!
//! - [`client`]: backend trait and the HTTP implementation
//! - [`poll`]: budgets, terminal classification, and the subscription loop
//! - [`tracker`]: registry of live subscriptions keyed by job id
//! - [`config`]: layered configuration (defaults, files, environment)

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod poll;
pub mod tracker;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{BackendConfig, BreakerSettings, Config, ConfigLoader, PollSettings};

// Error Types
pub use types::error::{ErrorCategory, FetchError, Result, WatchError};

// Domain Types
pub use types::{JobId, JobKind, JobSnapshot, JobStatus};

// =============================================================================
// Polling Re-exports
// =============================================================================

pub use poll::{
    CancelToken, PollBudget, PollConfig, PollHandle, PollOutcome, PollSubscription,
    StandardClassifier, TerminalClassifier,
};

// =============================================================================
// Client Re-exports
// =============================================================================

pub use client::{CircuitBreaker, CircuitState, HttpBackend, JobBackend, SharedBackend};
pub use tracker::JobTracker;
