//! Time-driven linear fade.
//!
//! At most one fade is in flight. Each step adds the fixed step length to
//! the elapsed time and interpolates between the start and target levels;
//! the step that reaches the duration lands exactly on the target.

use embassy_time::{Duration, Instant};
use log::debug;

use crate::timer::Deadline;

use super::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FadeState {
    start: Level,
    target: Level,
    elapsed_ms: u32,
    duration_ms: u32,
}

impl FadeState {
    /// `start + (target - start) * elapsed / duration`, rounded half away
    /// from zero. Widened to i64 so no intermediate can overflow.
    fn level_at(&self, elapsed_ms: u32) -> Level {
        let start = i64::from(self.start.get());
        let diff = i64::from(self.target.get()) - start;
        let dur = i64::from(self.duration_ms);
        let num = diff * i64::from(elapsed_ms);
        let step = (2 * num + num.signum() * dur) / (2 * dur);
        Level::new((start + step) as u8)
    }
}

pub struct Fade {
    state: Option<FadeState>,
    step: Duration,
    timer: Deadline,
}

impl Fade {
    pub fn new(step_ms: u16) -> Self {
        Self {
            state: None,
            step: Duration::from_millis(u64::from(step_ms.max(1))),
            timer: Deadline::idle(),
        }
    }

    /// Begin fading from `current` (the committed output) to `target`.
    ///
    /// Cancels any in-flight fade. Returns `Some(target)` when the change
    /// must be committed right away (zero duration or already there); the
    /// caller commits it and no steps follow. Otherwise the first step is
    /// due immediately and later ones every step length.
    pub fn fade_to(
        &mut self,
        current: Level,
        target: Level,
        duration_ms: u32,
        now: Instant,
    ) -> Option<Level> {
        self.cancel();
        if duration_ms == 0 || target == current {
            return Some(target);
        }

        debug!("fade: {} -> {} over {} ms", current, target, duration_ms);
        self.state = Some(FadeState {
            start: current,
            target,
            elapsed_ms: 0,
            duration_ms,
        });
        self.timer.arm(now);
        None
    }

    /// Run the pending step if due. Returns the level to commit.
    pub fn poll(&mut self, now: Instant) -> Option<Level> {
        let due = self.timer.fire_if_due(now)?;
        let state = self.state.as_mut()?;

        state.elapsed_ms = state
            .elapsed_ms
            .saturating_add(self.step.as_millis() as u32);
        if state.elapsed_ms >= state.duration_ms {
            let target = state.target;
            self.state = None;
            return Some(target);
        }

        let level = state.level_at(state.elapsed_ms);
        self.timer.arm(due + self.step);
        Some(level)
    }

    pub fn cancel(&mut self) {
        self.state = None;
        self.timer.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn target(&self) -> Option<Level> {
        self.state.map(|s| s.target)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.at()
    }
}
