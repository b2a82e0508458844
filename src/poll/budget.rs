//! Poll Budget
//!
//! Explicit cap on how long a subscription may keep polling. A job that
//! never reaches a terminal state must not be polled forever; exhausting
//! the budget produces a distinct timed-out outcome.

use std::time::Duration;

use crate::config::PollSettings;
use crate::constants::poll as poll_constants;

/// Limits on a poll subscription's lifetime
///
/// Either bound may be absent. A budget with neither bound polls forever;
/// the default applies both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    /// Maximum number of status fetches
    pub max_attempts: Option<u32>,
    /// Maximum wall-clock time since the subscription started
    pub max_elapsed: Option<Duration>,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_attempts: Some(poll_constants::DEFAULT_MAX_ATTEMPTS),
            max_elapsed: Some(Duration::from_secs(poll_constants::DEFAULT_MAX_ELAPSED_SECS)),
        }
    }
}

impl PollBudget {
    /// No limits: poll until terminal or cancelled
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            max_elapsed: None,
        }
    }

    /// Limit by attempt count only
    pub fn attempts(max: u32) -> Self {
        Self {
            max_attempts: Some(max),
            max_elapsed: None,
        }
    }

    /// Limit by elapsed time only
    pub fn elapsed(max: Duration) -> Self {
        Self {
            max_attempts: None,
            max_elapsed: Some(max),
        }
    }

    /// Check whether another fetch may be issued
    pub fn is_exhausted(&self, attempts_made: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.max_attempts
            && attempts_made >= max
        {
            return true;
        }
        if let Some(max) = self.max_elapsed
            && elapsed >= max
        {
            return true;
        }
        false
    }
}

impl From<&PollSettings> for PollBudget {
    fn from(settings: &PollSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            max_elapsed: settings.max_elapsed_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_exhausts() {
        let budget = PollBudget::unbounded();
        assert!(!budget.is_exhausted(u32::MAX, Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn test_attempt_limit() {
        let budget = PollBudget::attempts(3);
        assert!(!budget.is_exhausted(2, Duration::ZERO));
        assert!(budget.is_exhausted(3, Duration::ZERO));
        assert!(budget.is_exhausted(4, Duration::ZERO));
    }

    #[test]
    fn test_elapsed_limit() {
        let budget = PollBudget::elapsed(Duration::from_secs(10));
        assert!(!budget.is_exhausted(0, Duration::from_secs(9)));
        assert!(budget.is_exhausted(0, Duration::from_secs(10)));
    }

    #[test]
    fn test_either_bound_exhausts() {
        let budget = PollBudget {
            max_attempts: Some(5),
            max_elapsed: Some(Duration::from_secs(60)),
        };
        assert!(budget.is_exhausted(5, Duration::from_secs(1)));
        assert!(budget.is_exhausted(1, Duration::from_secs(60)));
        assert!(!budget.is_exhausted(4, Duration::from_secs(59)));
    }

    #[test]
    fn test_from_settings() {
        let settings = PollSettings {
            max_attempts: Some(7),
            max_elapsed_secs: None,
            ..Default::default()
        };
        let budget = PollBudget::from(&settings);
        assert_eq!(budget.max_attempts, Some(7));
        assert_eq!(budget.max_elapsed, None);
    }
}
