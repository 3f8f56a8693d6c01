//! Exponential backoff schedule for registry lookups.

use crate::config::RegistryConfig;
use std::time::Duration;

/// Retry schedule: the first attempt is immediate, and the wait after the
/// n-th failed attempt is `base_delay * 2^(n-1)`.
///
/// # Examples
///
/// ```
/// use depimpact_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100));
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(delays, vec![Duration::from_millis(100), Duration::from_millis(200)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy making at most `attempts` tries (at least one).
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.effective_attempts(), config.retry_base_delay())
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay to wait after `failed_attempt` (1-based) failed, or `None`
    /// when no attempts remain.
    pub fn backoff_after(&self, failed_attempt: u32) -> Option<Duration> {
        if failed_attempt == 0 || failed_attempt >= self.attempts {
            return None;
        }
        let factor = 1u32.checked_shl(failed_attempt - 1).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor))
    }

    /// All waits of a chain that fails every attempt, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.attempts).filter_map(|attempt| self.backoff_after(attempt))
    }
}
