//! Backoff policy for failed poll iterations.
//!
//! A sustained provider outage must not turn the poll loop into a
//! tight retry hammer. Consecutive failures double the wait up to a
//! cap; the first success resets it.

use std::time::Duration;

/// Backoff policy parameters
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    /// Delay after the first failure
    pub initial: Duration,
    /// Ceiling for the delay
    pub max: Duration,
    /// Growth factor per consecutive failure
    pub multiplier: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(900),
            multiplier: 2,
        }
    }
}

/// Tracks consecutive failures and yields the delay before the next attempt
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    consecutive_failures: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            consecutive_failures: 0,
        }
    }

    /// Record a failure and return how long to wait before retrying
    pub fn next_delay(&mut self) -> Duration {
        let mut delay = self.config.initial;
        for _ in 0..self.consecutive_failures {
            delay = delay.saturating_mul(self.config.multiplier);
            if delay >= self.config.max {
                break;
            }
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        delay.min(self.config.max)
    }

    /// Record a success; the next failure starts from the initial delay again
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }
}
