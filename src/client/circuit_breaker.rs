//! Circuit Breaker for Backend Resilience
//!
//! Keeps a flapping orchestration backend from being hammered by every
//! live poll subscription at once.
//!
//! ## States
//!
//! - **Closed**: Normal operation, requests flow through
//! - **Open**: Backend is failing, requests are rejected immediately
//! - **HalfOpen**: Testing if the backend has recovered
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failure_threshold reached]--> Open
//! Open --[recovery timeout elapsed]--> HalfOpen
//! HalfOpen --[success_threshold reached]--> Closed
//! HalfOpen --[failure]--> Open
//! ```
//!
//! Transitions out of Open are clock-based: the breaker re-evaluates its
//! state whenever it is consulted, so no background task is needed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::BreakerSettings;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - requests flow through
    Closed,
    /// Backend is failing - requests rejected immediately
    Open,
    /// Testing recovery - limited requests allowed
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// All mutable breaker state behind one lock so counter updates and
/// state transitions stay atomic.
#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    half_open_requests: u32,
    opened_at: Option<Instant>,
    blocked_count: u64,
}

impl BreakerInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            half_open_requests: 0,
            opened_at: None,
            blocked_count: 0,
        }
    }

    /// Apply the Open -> HalfOpen clock transition if due
    fn refresh(&mut self, recovery_timeout: Duration, endpoint: &str) {
        if self.state == CircuitState::Open
            && let Some(opened_at) = self.opened_at
            && opened_at.elapsed() >= recovery_timeout
        {
            self.state = CircuitState::HalfOpen;
            self.half_open_requests = 0;
            self.half_open_successes = 0;

            tracing::info!(
                endpoint = %endpoint,
                "Circuit breaker transitioning to HALF_OPEN (testing recovery)"
            );
        }
    }
}

/// Thread-safe circuit breaker guarding one backend endpoint.
pub struct CircuitBreaker {
    settings: BreakerSettings,
    endpoint: String,
    recovery_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker for a backend endpoint
    pub fn new(endpoint: impl Into<String>, settings: BreakerSettings) -> Self {
        let recovery_timeout = Duration::from_secs(settings.recovery_timeout_secs);
        Self {
            settings,
            endpoint: endpoint.into(),
            recovery_timeout,
            inner: Mutex::new(BreakerInner::new()),
        }
    }

    /// Create with default settings
    pub fn with_defaults(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, BreakerSettings::default())
    }

    /// Get current circuit state (applying any due clock transition)
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        inner.refresh(self.recovery_timeout, &self.endpoint);
        inner.state
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request can proceed, `false` if the circuit
    /// is open or the half-open probe budget is spent.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        inner.refresh(self.recovery_timeout, &self.endpoint);

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                inner.blocked_count += 1;
                tracing::debug!(
                    endpoint = %self.endpoint,
                    "Circuit breaker blocked request (circuit OPEN)"
                );
                false
            }
            CircuitState::HalfOpen => {
                if inner.half_open_requests < self.settings.half_open_max_requests {
                    inner.half_open_requests += 1;
                    true
                } else {
                    inner.blocked_count += 1;
                    tracing::debug!(
                        endpoint = %self.endpoint,
                        "Circuit breaker half-open probe limit reached"
                    );
                    false
                }
            }
        }
    }

    /// Record a successful request
    pub fn record_success(&self) {
        let mut inner = self.lock();

        inner.consecutive_failures = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.half_open_successes += 1;

            if inner.half_open_successes >= self.settings.success_threshold {
                inner.state = CircuitState::Closed;
                inner.half_open_successes = 0;
                inner.half_open_requests = 0;
                inner.opened_at = None;

                tracing::info!(
                    endpoint = %self.endpoint,
                    "Circuit breaker closed (backend recovered)"
                );
            }
        }
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        let mut inner = self.lock();

        inner.half_open_successes = 0;

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;

                if inner.consecutive_failures >= self.settings.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    inner.half_open_requests = 0;

                    tracing::warn!(
                        endpoint = %self.endpoint,
                        failures = self.settings.failure_threshold,
                        recovery_timeout = ?self.recovery_timeout,
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                // Any failure while probing reopens the circuit
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.half_open_requests = 0;
                inner.consecutive_failures = 0;

                tracing::warn!(
                    endpoint = %self.endpoint,
                    "Circuit breaker re-opened after failure in half-open state"
                );
            }
            CircuitState::Open => {}
        }
    }

    /// Get statistics for monitoring
    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.lock();

        CircuitBreakerStats {
            endpoint: self.endpoint.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            blocked_count: inner.blocked_count,
            time_open: inner.opened_at.map(|t| t.elapsed()),
        }
    }

    /// Force reset to closed state (for manual intervention)
    pub fn reset(&self) {
        let mut inner = self.lock();
        *inner = BreakerInner::new();

        tracing::info!(endpoint = %self.endpoint, "Circuit breaker manually reset to CLOSED");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Statistics for monitoring circuit breaker state
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub endpoint: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub blocked_count: u64,
    pub time_open: Option<Duration>,
}

impl CircuitBreakerStats {
    /// Format as human-readable summary
    pub fn summary(&self) -> String {
        let time_str = self
            .time_open
            .map(|d| format!(" for {:.1}s", d.as_secs_f64()))
            .unwrap_or_default();

        format!(
            "[{}] {} | failures={} blocked={}{}",
            self.endpoint, self.state, self.consecutive_failures, self.blocked_count, time_str
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(failure: u32, success: u32, recovery_secs: u64) -> BreakerSettings {
        BreakerSettings {
            failure_threshold: failure,
            success_threshold: success,
            recovery_timeout_secs: recovery_secs,
            half_open_max_requests: 5,
        }
    }

    #[test]
    fn test_initial_state_is_closed() {
        let cb = CircuitBreaker::with_defaults("backend");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let cb = CircuitBreaker::new("backend", settings(3, 2, 30));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = CircuitBreaker::new("backend", settings(3, 2, 30));

        cb.record_failure();
        cb.record_failure();
        cb.record_success();

        cb.record_failure();
        cb.record_failure();
        // Still closed because success reset the count
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_closes_on_success() {
        let cb = CircuitBreaker::new("backend", settings(1, 2, 0));

        cb.record_failure();
        // Zero recovery timeout: the next consultation probes immediately
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.allow_request());

        cb.record_success();
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_opens_on_failure() {
        let cb = CircuitBreaker::new("backend", settings(1, 2, 0));

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_failure();
        // Re-opened; with a zero timeout the very next check probes again,
        // so inspect without the clock transition via stats
        assert_eq!(cb.stats().state, CircuitState::Open);
    }

    #[test]
    fn test_half_open_probe_limit() {
        let cb = CircuitBreaker::new(
            "backend",
            BreakerSettings {
                failure_threshold: 1,
                success_threshold: 10,
                recovery_timeout_secs: 0,
                half_open_max_requests: 2,
            },
        );

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        assert!(cb.allow_request());
        assert!(cb.allow_request());
        assert!(!cb.allow_request());
    }

    #[test]
    fn test_blocked_count() {
        let cb = CircuitBreaker::new("backend", settings(1, 2, 60));

        cb.record_failure();
        assert!(!cb.allow_request());
        assert!(!cb.allow_request());
        assert!(!cb.allow_request());

        assert_eq!(cb.stats().blocked_count, 3);
    }

    #[test]
    fn test_manual_reset() {
        let cb = CircuitBreaker::new("backend", settings(1, 2, 60));

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }
}
