pub mod error;
pub mod job;

pub use error::{ErrorCategory, ErrorClassifier, FetchError, Result, WatchError};
pub use job::{JobId, JobKind, JobSnapshot, JobStatus};
