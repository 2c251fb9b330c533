//! Debounced button with short/long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The GPIO interrupt fires on
//! both edges and only marks [`BUTTON_EDGES`](crate::events::BUTTON_EDGES);
//! the worker calls [`ButtonDetector::on_edge`] and [`ButtonDetector::poll`].
//!
//! ## Debounce
//!
//! Every edge (re)arms a settle deadline. When the line has been quiet for
//! the debounce window the level is sampled once and compared with the
//! debounced state, so a burst of bounce edges collapses into at most one
//! transition.
//!
//! ## Gestures
//!
//! | Gesture     | Condition                         | Intent         |
//! |-------------|-----------------------------------|----------------|
//! | Short press | released before the long-press   | `Toggle`       |
//! | Long press  | still held at the long-press mark | `FactoryReset` |

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{Error as _, InputPin};
use log::{debug, info, warn};

use crate::timer::{Deadline, earliest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIntent {
    Toggle,
    FactoryReset,
}

pub struct ButtonDetector<P> {
    pin: P,
    debounce: Duration,
    long_press: Duration,
    pressed: bool,
    press_start: Instant,
    settle: Deadline,
    long_press_timer: Deadline,
}

impl<P: InputPin> ButtonDetector<P> {
    pub fn new(pin: P, debounce: Duration, long_press: Duration) -> Self {
        Self {
            pin,
            debounce,
            long_press,
            pressed: false,
            press_start: Instant::from_ticks(0),
            settle: Deadline::idle(),
            long_press_timer: Deadline::idle(),
        }
    }

    /// One or more raw edges were latched.
    pub fn on_edge(&mut self, now: Instant) {
        self.settle.arm_after(now, self.debounce);
    }

    /// Process due deadlines. At most one intent per call; the long-press
    /// deadline is handled before the settle sample.
    pub fn poll(&mut self, now: Instant) -> Option<ButtonIntent> {
        if self.long_press_timer.fire_if_due(now).is_some() && self.pressed {
            info!("button: long press");
            return Some(ButtonIntent::FactoryReset);
        }

        self.settle.fire_if_due(now)?;
        let level_pressed = match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("button: read failed ({:?})", e.kind());
                return None;
            }
        };

        match (self.pressed, level_pressed) {
            (false, true) => {
                debug!("button: pressed");
                self.pressed = true;
                self.press_start = now;
                self.long_press_timer.arm_after(now, self.long_press);
                None
            }
            (true, false) => {
                self.pressed = false;
                self.long_press_timer.cancel();
                let held = now.saturating_duration_since(self.press_start);
                debug!("button: released after {} ms", held.as_millis());
                (held < self.long_press).then_some(ButtonIntent::Toggle)
            }
            // Bounce that settled back to the debounced state.
            _ => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.settle.at(), self.long_press_timer.at())
    }
}
