//! Shared command plumbing
//!
//! Backend construction and poll-config resolution used by every command
//! that talks to the orchestration backend.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{HttpBackend, SharedBackend};
use crate::config::Config;
use crate::poll::{PollBudget, PollConfig};
use crate::types::Result;

/// Build the HTTP backend from effective configuration
pub fn build_backend(config: &Config) -> Result<SharedBackend> {
    let backend = HttpBackend::new(&config.backend, config.breaker.clone())?;
    Ok(Arc::new(backend))
}

/// Resolve the poll configuration, applying CLI overrides on top of config
pub fn resolve_poll_config(
    config: &Config,
    interval_ms: Option<u64>,
    max_attempts: Option<u32>,
    max_elapsed_secs: Option<u64>,
) -> PollConfig {
    let mut poll_config = PollConfig::from(&config.poll);

    if let Some(ms) = interval_ms {
        poll_config.interval = Duration::from_millis(ms);
    }
    if max_attempts.is_some() || max_elapsed_secs.is_some() {
        poll_config.budget = PollBudget {
            max_attempts: max_attempts.or(poll_config.budget.max_attempts),
            max_elapsed: max_elapsed_secs
                .map(Duration::from_secs)
                .or(poll_config.budget.max_elapsed),
        };
    }

    poll_config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let config = Config::default();
        let resolved = resolve_poll_config(&config, Some(5000), Some(10), None);

        assert_eq!(resolved.interval, Duration::from_millis(5000));
        assert_eq!(resolved.budget.max_attempts, Some(10));
        // Unspecified bound keeps the configured value
        assert_eq!(
            resolved.budget.max_elapsed,
            Some(Duration::from_secs(
                crate::constants::poll::DEFAULT_MAX_ELAPSED_SECS
            ))
        );
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = Config::default();
        let resolved = resolve_poll_config(&config, None, None, None);
        assert_eq!(
            resolved.interval,
            Duration::from_millis(config.poll.interval_ms)
        );
    }
}
