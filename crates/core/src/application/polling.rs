// Poll cadence for waiting on remote jobs

use super::constants::{
    DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, POLL_BACKOFF_FACTOR,
};
use std::time::Duration;

/// Exponential poll backoff
///
/// delay(n) = min(initial * factor^n, max), never below [`MIN_POLL_INTERVAL`]
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    initial_interval: Duration,
    max_interval: Duration,
    backoff_factor: f64,
}

impl PollPolicy {
    pub fn new(initial_interval: Duration, max_interval: Duration, backoff_factor: f64) -> Self {
        let initial_interval = initial_interval.max(MIN_POLL_INTERVAL);
        Self {
            initial_interval,
            max_interval: max_interval.max(initial_interval),
            backoff_factor: if backoff_factor.is_finite() && backoff_factor >= 1.0 {
                backoff_factor
            } else {
                1.0
            },
        }
    }

    /// Same interval on every poll
    pub fn fixed(interval: Duration) -> Self {
        Self::new(interval, interval, 1.0)
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Interval following `current`
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.backoff_factor)
            .clamp(MIN_POLL_INTERVAL, self.max_interval)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, POLL_BACKOFF_FACTOR)
    }
}
