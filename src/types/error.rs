//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification so callers can decide whether a failed
//! fetch should keep a poll loop alive or abort an operation outright.
//!
//! ## Error Categories
//!
//! - **Transient**: Temporary backend issues (keep polling)
//! - **RateLimit**: Backend rate limiting (wait and retry)
//! - **Auth**: Authentication failures (fail fast)
//! - **Network**: Connectivity issues (keep polling)
//! - **Unavailable**: Backend or job endpoint unavailable
//!
//! ## Design Principles
//!
//! - Single unified error type (WatchError) for the entire application
//! - No error is logged-and-swallowed: every failure is a typed value the
//!   caller receives and routes
//! - Category-based decisions for retry and loop-continuation
//! - No panic/unwrap outside tests

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry and loop-continuation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Network/connectivity issues - retry on the next interval
    Network,
    /// Backend unavailable (or circuit open) - retry on the next interval
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Response body could not be parsed
    ParseError,
    /// Temporary server issues - retry on the next interval
    Transient,
    /// Unknown error - conservative retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if a failed fetch in this category should keep a poll loop alive
    ///
    /// A poll subscription continues through anything retryable; only
    /// categories that can never succeed on a repeat (bad request, auth)
    /// are worth surfacing as fatal to the subscription owner.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Auth | Self::BadRequest)
    }

    /// Get recommended wait before retrying this category
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_secs(30),
            Self::Network => Duration::from_secs(5),
            Self::Transient => Duration::from_secs(2),
            _ => Duration::from_millis(500),
        }
    }
}

// =============================================================================
// Fetch Error
// =============================================================================

/// A failed backend request with category, context, and retry hints
#[derive(Debug, Clone)]
pub struct FetchError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Endpoint that produced the error
    pub endpoint: Option<String>,
    /// Suggested wait time before retry (if the backend provided one)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(endpoint) = &self.endpoint {
            write!(f, "[{}:{}] {}", endpoint, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            endpoint: None,
            retry_after: None,
        }
    }

    /// Add endpoint context
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Check if this failure should keep a poll loop alive
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    /// Get recommended wait before retrying
    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.category.recommended_delay())
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Classifies raw transport failures into [`FetchError`] values
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code
    pub fn classify_http_status(status: u16, message: &str, endpoint: &str) -> FetchError {
        match status {
            429 => FetchError::new(ErrorCategory::RateLimit, message)
                .endpoint(endpoint)
                .retry_after(Duration::from_secs(30)),
            401 | 403 => FetchError::new(ErrorCategory::Auth, message).endpoint(endpoint),
            400 | 422 => FetchError::new(ErrorCategory::BadRequest, message).endpoint(endpoint),
            404 => FetchError::new(ErrorCategory::Unavailable, message).endpoint(endpoint),
            // 500 series are transient - can retry
            500 | 502 | 503 | 504 => FetchError::new(ErrorCategory::Transient, message)
                .endpoint(endpoint)
                .retry_after(Duration::from_secs(5)),
            _ => FetchError::new(ErrorCategory::Unknown, message).endpoint(endpoint),
        }
    }

    /// Classify a reqwest transport error
    pub fn classify_transport(err: &reqwest::Error, endpoint: &str) -> FetchError {
        if err.is_connect() || err.is_timeout() {
            FetchError::new(ErrorCategory::Network, err.to_string())
                .endpoint(endpoint)
                .retry_after(Duration::from_secs(5))
        } else if err.is_decode() {
            FetchError::new(ErrorCategory::ParseError, err.to_string()).endpoint(endpoint)
        } else {
            FetchError::new(ErrorCategory::Unknown, err.to_string()).endpoint(endpoint)
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum WatchError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// Classified backend request failure
    #[error("Fetch error: {0}")]
    Fetch(FetchError),

    /// Job submission failed; no subscription was created
    #[error("Submit failed for {kind} job: {reason}")]
    Submit { kind: String, reason: String },

    /// Backend accepted a submission but returned an unusable identifier
    #[error("Backend returned an empty job identifier")]
    EmptyJobId,

    // -------------------------------------------------------------------------
    // Polling Errors
    // -------------------------------------------------------------------------
    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Poll budget exhausted before the job reached a terminal state
    #[error("Poll budget exhausted after {attempts} attempts ({elapsed:?})")]
    BudgetExhausted { attempts: u32, elapsed: Duration },

    /// No live subscription exists for the requested job
    #[error("No active subscription for job: {0}")]
    NotSubscribed(String),

    /// Subscription task ended abnormally (panicked or was aborted)
    #[error("Subscription task failed: {0}")]
    Subscription(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),
}

impl From<FetchError> for WatchError {
    fn from(err: FetchError) -> Self {
        WatchError::Fetch(err)
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl WatchError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a submit error
    pub fn submit(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Submit {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable (a repeat attempt may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Unavailable.to_string(), "UNAVAILABLE");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Transient.is_retryable());
        assert!(ErrorCategory::Unavailable.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "backend");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);
        assert!(rate_limit.retry_after.is_some());

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "backend");
        assert_eq!(auth.category, ErrorCategory::Auth);
        assert!(!auth.is_retryable());

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "backend");
        assert_eq!(server_error.category, ErrorCategory::Transient);
        assert!(server_error.is_retryable());

        let missing = ErrorClassifier::classify_http_status(404, "Not found", "backend");
        assert_eq!(missing.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_recommended_delay() {
        let rate_limit = FetchError::new(ErrorCategory::RateLimit, "test");
        assert!(rate_limit.recommended_delay() >= Duration::from_secs(30));

        let custom =
            FetchError::new(ErrorCategory::Unknown, "test").retry_after(Duration::from_secs(100));
        assert_eq!(custom.recommended_delay(), Duration::from_secs(100));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::new(ErrorCategory::RateLimit, "Too many requests").endpoint("backend");
        assert_eq!(err.to_string(), "[backend:RATE_LIMIT] Too many requests");

        let err_no_endpoint = FetchError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_endpoint.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_watch_error_recoverable() {
        let fetch = WatchError::from(FetchError::new(ErrorCategory::Network, "down"));
        assert!(fetch.is_recoverable());

        let auth = WatchError::from(FetchError::new(ErrorCategory::Auth, "bad key"));
        assert!(!auth.is_recoverable());

        assert!(WatchError::timeout("fetch", Duration::from_secs(30)).is_recoverable());
        assert!(!WatchError::Config("bad".into()).is_recoverable());
    }
}
