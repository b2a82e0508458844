//! Job Domain Types
//!
//! A job is a unit of backend work (batch evaluation, workflow execution,
//! or debate session) tracked by an opaque identifier and a status. The
//! client never mutates job state directly; it only observes snapshots
//! returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Job Identifier
// =============================================================================

/// Type-safe wrapper for job identifiers
///
/// Identifiers are opaque strings assigned by the backend. The wrapper
/// prevents accidental mixing with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// An identifier must be non-empty to be addressable
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Job Kind
// =============================================================================

/// Kind of backend work a job represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Batch evaluation run
    EvaluationBatch,
    /// Workflow execution
    WorkflowExecution,
    /// Multi-agent debate session
    DebateSession,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvaluationBatch => write!(f, "evaluation_batch"),
            Self::WorkflowExecution => write!(f, "workflow_execution"),
            Self::DebateSession => write!(f, "debate_session"),
        }
    }
}

impl std::str::FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "evaluation_batch" => Ok(Self::EvaluationBatch),
            "workflow_execution" => Ok(Self::WorkflowExecution),
            "debate_session" => Ok(Self::DebateSession),
            _ => Err(format!(
                "Unknown job kind: {}. Valid values: evaluation_batch, workflow_execution, debate_session",
                s
            )),
        }
    }
}

// =============================================================================
// Job Status
// =============================================================================

/// Remote job status as reported by the backend
///
/// The wire format is a bare string. Statuses the client does not recognize
/// are preserved verbatim in `Other` rather than rejected, and are treated
/// as non-terminal by the classifier so polling continues.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    /// Unrecognized status string, preserved for display
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }

    /// Whether no further transition can occur from this status
    ///
    /// Unrecognized statuses are non-terminal: the backend may be ahead of
    /// this client, and stopping early would strand an active job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the job finished without error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for JobStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

// =============================================================================
// Job Snapshot
// =============================================================================

/// Point-in-time view of a job as returned by the backend
///
/// Snapshots are immutable observations; a newer snapshot wholly replaces
/// an older one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Backend-assigned identifier
    pub id: JobId,

    /// Kind of work, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<JobKind>,

    /// Current status
    pub status: JobStatus,

    /// Kind-specific result payload, present once the job completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure message for failed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the backend created the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// Minimal snapshot, used by tests and as a submit-response fallback
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            kind: None,
            status,
            result: None,
            error: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn with_kind(mut self, kind: JobKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}
