//! Owned, cancellable one-shot deadlines.
//!
//! Every timed behaviour in the worker (fade step, effect step, debounce
//! settle, long-press, status blink, battery period) holds one
//! [`Deadline`]. Arming always replaces the previous instant, so there is
//! never more than one pending instance of a given timer.
//!
//! The worker polls with the current time; the earliest armed deadline
//! across all components tells it how long it may sleep.

use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub const fn idle() -> Self {
        Self { at: None }
    }

    /// Cancel any pending instance and arm for `at`.
    pub fn arm(&mut self, at: Instant) {
        self.at = Some(at);
    }

    /// Cancel any pending instance and arm for `now + after`.
    pub fn arm_after(&mut self, now: Instant, after: Duration) {
        self.arm(now + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn at(&self) -> Option<Instant> {
        self.at
    }

    /// If armed and `now` has reached the deadline, disarm and return the
    /// instant it was due. The caller re-arms from the due instant to keep
    /// periodic cadences drift-free.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<Instant> {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                Some(at)
            }
            _ => None,
        }
    }
}

/// The earlier of two optional instants.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
