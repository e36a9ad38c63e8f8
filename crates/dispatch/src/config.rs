//! Wait-and-retry configuration for the polling completion strategy.

use std::time::Duration;

use docrelay_core::error::CoreError;

use crate::error::DispatchError;

/// Parameters bounding asynchronous completion detection.
///
/// Both values are required inputs supplied by the caller (or the
/// environment in binaries) — never process-wide globals.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// How long each worker sleeps between existence checks.
    pub poll_interval: Duration,
    /// Total wait budget per job. The number of poll attempts is
    /// `floor(timeout_budget / poll_interval)`.
    pub timeout_budget: Duration,
}

impl PollConfig {
    /// Create a validated configuration. The poll interval must be
    /// non-zero or the attempt count would be unbounded.
    pub fn new(poll_interval: Duration, timeout_budget: Duration) -> Result<Self, DispatchError> {
        if poll_interval.is_zero() {
            return Err(CoreError::Validation(
                "Poll interval must be greater than zero".to_string(),
            )
            .into());
        }
        Ok(Self {
            poll_interval,
            timeout_budget,
        })
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `POLL_INTERVAL_SECS`   | `5`     |
    /// | `TIMEOUT_BUDGET_SECS`  | `300`   |
    pub fn from_env() -> Self {
        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let timeout_budget_secs: u64 = std::env::var("TIMEOUT_BUDGET_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("TIMEOUT_BUDGET_SECS must be a valid u64");

        Self::new(
            Duration::from_secs(poll_interval_secs),
            Duration::from_secs(timeout_budget_secs),
        )
        .expect("POLL_INTERVAL_SECS must be greater than zero")
    }

    /// Number of existence checks a job makes before timing out:
    /// `floor(timeout_budget / poll_interval)`.
    pub fn attempts(&self) -> u32 {
        (self.timeout_budget.as_millis() / self.poll_interval.as_millis()) as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use docrelay_core::error::CoreError;

    #[test]
    fn attempts_is_floor_of_budget_over_interval() {
        let cfg = PollConfig::new(Duration::from_secs(5), Duration::from_secs(10)).unwrap();
        assert_eq!(cfg.attempts(), 2);

        let cfg = PollConfig::new(Duration::from_secs(5), Duration::from_secs(14)).unwrap();
        assert_eq!(cfg.attempts(), 2);

        let cfg = PollConfig::new(Duration::from_secs(5), Duration::from_secs(15)).unwrap();
        assert_eq!(cfg.attempts(), 3);
    }

    #[test]
    fn budget_smaller_than_interval_means_zero_attempts() {
        let cfg = PollConfig::new(Duration::from_secs(5), Duration::from_secs(3)).unwrap();
        assert_eq!(cfg.attempts(), 0);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = PollConfig::new(Duration::ZERO, Duration::from_secs(10)).unwrap_err();
        assert_matches!(err, DispatchError::Core(CoreError::Validation(_)));
    }
}
