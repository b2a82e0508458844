//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Polling constants
pub mod poll {
    /// Default interval between status fetches (milliseconds)
    pub const DEFAULT_INTERVAL_MS: u64 = 2000;

    /// Upper bound for a sensible polling interval (milliseconds)
    ///
    /// Intervals above this are accepted but logged as a warning since
    /// terminal states will be observed late.
    pub const MAX_SENSIBLE_INTERVAL_MS: u64 = 60_000;

    /// Timeout for a single status fetch (seconds)
    pub const FETCH_TIMEOUT_SECS: u64 = 30;

    /// Default maximum number of fetch attempts before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 300;

    /// Default maximum wall-clock time for a subscription (seconds)
    pub const DEFAULT_MAX_ELAPSED_SECS: u64 = 1800;
}

/// Circuit breaker constants
pub mod circuit_breaker {
    /// Number of consecutive failures before opening circuit
    pub const FAILURE_THRESHOLD: u32 = 5;

    /// Duration to wait before attempting recovery (seconds)
    pub const RECOVERY_TIMEOUT_SECS: u64 = 30;

    /// Maximum requests allowed in half-open state
    pub const HALF_OPEN_MAX_REQUESTS: u32 = 3;

    /// Success threshold to close circuit from half-open
    pub const SUCCESS_THRESHOLD: u32 = 2;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
}
