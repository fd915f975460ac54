//! Retry policy for the upstream analysis call.

use std::time::Duration;

/// Bounded exponential backoff with deterministic jitter.
///
/// The delay before attempt `n` grows as `base * 2^(n-1)`, capped at
/// `max_delay`, then spread by ±`jitter` so workers retrying at the same
/// moment fan out instead of stampeding the provider. None of the defaults
/// are contractual; they are configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first (1 = no retries).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap applied to the exponential growth.
    pub max_delay: Duration,
    /// Jitter fraction in `[0.0, 1.0]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Policy that gives up after the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// True while another attempt is allowed after `attempt` attempts ran.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff to sleep after attempt number `attempt` (1-indexed) failed.
    ///
    /// `salt` individualizes the jitter per job so concurrent retries of
    /// different reviews spread out; the spread is deterministic for a given
    /// (salt, attempt) pair, which keeps tests stable.
    pub fn delay_for_attempt(&self, attempt: u32, salt: u64) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let exp = 2_f64.powi(attempt.saturating_sub(1).min(20) as i32);
        let delay_ms = (base_ms * exp).min(max_ms);

        // Cheap multiplicative hash; good enough to de-synchronize workers.
        let mix = salt
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(attempt as u64);
        let unit = ((mix >> 33) % 1000) as f64 / 1000.0;
        let offset = delay_ms * self.jitter * (unit * 2.0 - 1.0);

        Duration::from_millis((delay_ms + offset).max(0.0) as u64)
    }
}
