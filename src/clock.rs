//! Time sources.
//!
//! Guards and controllers that depend on wall-clock time take an injected
//! [`Clock`] so tests can pin time down.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Move the clock forward by `step` and return the new time.
    ///
    /// Returns `None` and leaves the clock untouched when the result would
    /// fall outside the representable range.
    pub fn advance(&self, step: Duration) -> Option<DateTime<Utc>> {
        let next = self.now.get().checked_add_signed(step)?;
        self.now.set(next);
        Some(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
