//! Staircase backoff.
//!
//! The delay stays flat for `slow_down_every` attempts and then doubles,
//! so the sleep after failed attempt `k` is
//! `base_delay * 2^((k - 1) / slow_down_every)`.

use std::time::Duration;

use crate::config::DispatchConfig;

/// Retry parameters shared by every dispatch of a [`Dispatcher`](super::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep after the first failed attempt.
    pub base_delay: Duration,
    /// Number of attempts between two doublings of the delay.
    pub slow_down_every: u32,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(30),
            slow_down_every: 10,
            max_attempts: 100,
        }
    }
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            base_delay: config.base_delay(),
            slow_down_every: config.slow_down_every.max(1),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

/// Attempt counter and current delay of a single dispatch.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempts: u32,
    delay: Duration,
    slow_down_every: u32,
    max_attempts: u32,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts: 0,
            delay: policy.base_delay,
            slow_down_every: policy.slow_down_every.max(1),
            max_attempts: policy.max_attempts.max(1),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Count a new attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Record that the current attempt failed.
    ///
    /// Returns how long to wait before the next attempt, or `None` once the
    /// attempt ceiling has been reached.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        if self.attempts > 1 && (self.attempts - 1) % self.slow_down_every == 0 {
            self.delay = self.delay.saturating_mul(2);
        }
        Some(self.delay)
    }
}
