//! Round countdown.
//!
//! A soft deadline checked once per dealer poll; nothing preempts the dealer
//! when it passes. Callers pass `now` explicitly so the arithmetic can be
//! tested without sleeping.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    duration: Duration,
    warning: Duration,
    deadline: Instant,
}

impl Countdown {
    /// A countdown of `duration` starting now.
    #[must_use]
    pub fn new(duration: Duration, warning: Duration) -> Self {
        Self::starting_at(duration, warning, Instant::now())
    }

    #[must_use]
    pub fn starting_at(duration: Duration, warning: Duration, now: Instant) -> Self {
        Self {
            duration,
            warning,
            deadline: now + duration,
        }
    }

    /// Restart the countdown from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = now + self.duration;
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Whether the remaining time is within the warning threshold.
    #[must_use]
    pub fn is_warning(&self, now: Instant) -> bool {
        self.remaining(now) <= self.warning
    }
}
