//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/jobwatch/) and project (.jobwatch/) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{circuit_breaker as cb_constants, network, poll};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Orchestration backend settings
    pub backend: BackendConfig,

    /// Status polling settings
    pub poll: PollSettings,

    /// Circuit breaker settings
    pub breaker: BreakerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::default(),
            poll: PollSettings::default(),
            breaker: BreakerSettings::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `WatchError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(crate::types::WatchError::Config(
                "poll.interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.poll.interval_ms > poll::MAX_SENSIBLE_INTERVAL_MS {
            // Accepted, but terminal states will be observed late
            tracing::warn!(
                interval_ms = self.poll.interval_ms,
                "poll.interval_ms exceeds {} ms",
                poll::MAX_SENSIBLE_INTERVAL_MS
            );
        }

        if self.poll.fetch_timeout_secs == 0 {
            return Err(crate::types::WatchError::Config(
                "poll.fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(crate::types::WatchError::Config(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.breaker.failure_threshold == 0 || self.breaker.success_threshold == 0 {
            return Err(crate::types::WatchError::Config(
                "breaker thresholds must be greater than 0".to_string(),
            ));
        }

        // Endpoint must at least parse; scheme checks happen when the
        // backend client is constructed.
        url::Url::parse(&self.backend.endpoint).map_err(|e| {
            crate::types::WatchError::Config(format!(
                "Invalid backend endpoint '{}': {}",
                self.backend.endpoint, e
            ))
        })?;

        Ok(())
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

/// Configuration for the orchestration backend client
///
/// Note: the API token is never serialized to output and is redacted in
/// debug output. The HTTP client converts it to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the orchestration backend
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Bearer token for authenticated backends.
    /// Never serialized to output for security.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: network::CONNECTION_TIMEOUT_SECS,
            api_token: None,
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Poll Configuration
// =============================================================================

/// Status polling cadence and budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Interval between status fetches (milliseconds)
    pub interval_ms: u64,

    /// Timeout for a single status fetch (seconds)
    pub fetch_timeout_secs: u64,

    /// Maximum fetch attempts before giving up (None = unbounded)
    pub max_attempts: Option<u32>,

    /// Maximum wall-clock duration before giving up, in seconds
    /// (None = unbounded)
    pub max_elapsed_secs: Option<u64>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: poll::DEFAULT_INTERVAL_MS,
            fetch_timeout_secs: poll::FETCH_TIMEOUT_SECS,
            max_attempts: Some(poll::DEFAULT_MAX_ATTEMPTS),
            max_elapsed_secs: Some(poll::DEFAULT_MAX_ELAPSED_SECS),
        }
    }
}

// =============================================================================
// Circuit Breaker Configuration
// =============================================================================

/// Circuit breaker tuning for the backend client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,

    /// Consecutive half-open successes required to close the circuit
    pub success_threshold: u32,

    /// Seconds to wait before probing an open circuit
    pub recovery_timeout_secs: u64,

    /// Maximum probe requests allowed while half-open
    pub half_open_max_requests: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: cb_constants::FAILURE_THRESHOLD,
            success_threshold: cb_constants::SUCCESS_THRESHOLD,
            recovery_timeout_secs: cb_constants::RECOVERY_TIMEOUT_SECS,
            half_open_max_requests: cb_constants::HALF_OPEN_MAX_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        config.poll.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let mut config = Config::default();
        config.backend.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_breaker_threshold_rejected() {
        let mut config = Config::default();
        config.breaker.failure_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let config = BackendConfig {
            api_token: Some("secret-token".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_token_never_serialized() {
        let config = BackendConfig {
            api_token: Some("secret-token".to_string()),
            ..Default::default()
        };
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("secret-token"));
    }
}
