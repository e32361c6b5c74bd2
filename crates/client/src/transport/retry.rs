//! Call-local retry state
//!
//! One [`RetryState`] lives for the duration of a single logical call and
//! is discarded after success, exhaustion, or a non-retryable error. The
//! delay starts at the configured base and doubles on every retry; retrying
//! stops once the cumulative sleep would exceed the ceiling.

use std::time::Duration;

#[derive(Debug)]
pub(crate) struct RetryState {
    next_delay: Duration,
    cumulative: Duration,
    ceiling: Duration,
}

impl RetryState {
    pub(crate) fn new(base: Duration, ceiling: Duration) -> Self {
        Self { next_delay: base, cumulative: Duration::ZERO, ceiling }
    }

    /// Reserve the next backoff delay, or `None` when the budget is spent.
    ///
    /// A ceiling of zero disables retrying entirely: the first failure is
    /// terminal and no sleep happens.
    pub(crate) fn next_backoff(&mut self) -> Option<Duration> {
        if self.ceiling.is_zero() {
            return None;
        }
        let delay = self.next_delay;
        if self.cumulative + delay > self.ceiling {
            return None;
        }
        self.cumulative += delay;
        self.next_delay = delay.saturating_mul(2);
        Some(delay)
    }

    /// Total delay reserved so far.
    pub(crate) fn cumulative(&self) -> Duration {
        self.cumulative
    }
}
