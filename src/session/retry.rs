//! Declarative acquisition retry policy.

use crate::config::ScanConfig;
use std::time::Duration;

/// Bounded retry with constant backoff.
///
/// Applied uniformly by the scan session around the strategy call;
/// the session checks its cancellation flag after each backoff, so a
/// `stop` during the wait ends the sequence instead of burning another
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy with the given bound and backoff.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// The policy configured for a scan session.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.max_attempts, config.backoff())
    }

    /// Whether another attempt remains after `attempt` (1-based).
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff to wait after `attempt` (1-based). Constant for now.
    pub fn backoff_after(&self, _attempt: u32) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}
