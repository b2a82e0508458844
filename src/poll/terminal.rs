//! Terminal State Classification
//!
//! Pure predicate deciding whether a poll loop should stop for a given
//! job status. Kept behind a trait so a subscription can be parameterized
//! with backend-specific terminal sets.

use crate::types::JobStatus;

/// Decides whether a status ends a poll subscription
pub trait TerminalClassifier: Send + Sync {
    /// Whether no further transition can occur from this status
    fn is_terminal(&self, status: &JobStatus) -> bool;
}

/// Default classifier: `completed`, `failed`, and `cancelled` are terminal;
/// `pending`, `running`, and anything unrecognized are not.
///
/// Unrecognized statuses continue polling on purpose: the backend may
/// report states this client predates, and stopping on one would strand
/// an active job.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClassifier;

impl TerminalClassifier for StandardClassifier {
    fn is_terminal(&self, status: &JobStatus) -> bool {
        status.is_terminal()
    }
}

/// Any plain predicate works as a classifier
impl<F> TerminalClassifier for F
where
    F: Fn(&JobStatus) -> bool + Send + Sync,
{
    fn is_terminal(&self, status: &JobStatus) -> bool {
        self(status)
    }
}
