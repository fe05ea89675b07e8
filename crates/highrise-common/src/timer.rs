//! Millisecond timers driven by the host frame clock.
//!
//! Nothing here sleeps. Every check compares the current tick timestamp with a
//! stored timestamp.

use serde::{Deserialize, Serialize};

/// Scene time or elapsed time in milliseconds.
pub type Millis = f64;

/// Fixed-period gate: ready once `period` has elapsed since the last trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    period: Millis,
    last: Option<Millis>,
}

impl Cooldown {
    /// Creates a cooldown that has never been triggered.
    #[must_use]
    pub const fn new(period: Millis) -> Self {
        Self { period, last: None }
    }

    /// Checks whether the gate is open at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Millis) -> bool {
        self.last.map_or(true, |last| now - last >= self.period)
    }

    /// Stamps the gate as used at `now`.
    pub fn trigger(&mut self, now: Millis) {
        self.last = Some(now);
    }

    /// Triggers and returns true if the gate is open, otherwise returns false.
    pub fn try_trigger(&mut self, now: Millis) -> bool {
        if self.is_ready(now) {
            self.trigger(now);
            true
        } else {
            false
        }
    }
}

/// A point in time before which something is blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Deadline(Option<Millis>);

impl Deadline {
    /// A deadline that never blocks.
    pub const NONE: Self = Self(None);

    /// Blocks until `until`.
    #[must_use]
    pub const fn at(until: Millis) -> Self {
        Self(Some(until))
    }

    /// Checks whether `now` is still before the deadline.
    #[must_use]
    pub fn is_pending(&self, now: Millis) -> bool {
        self.0.is_some_and(|until| now < until)
    }

    /// Clears the deadline.
    pub fn clear(&mut self) {
        self.0 = None;
    }
}
