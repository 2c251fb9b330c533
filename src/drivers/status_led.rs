//! Single-GPIO status LED.
//!
//! | Network state | Output                          |
//! |---------------|---------------------------------|
//! | Not joined    | toggles every `blink` period    |
//! | Joined        | held off                        |
//! | Reset ack     | 6 fast toggles, then back above |
//!
//! The pin is optional: boards without the LED (or where the GPIO failed
//! to initialise) run with `None` and every call is a no-op on output,
//! while the timing state still advances.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::timer::Deadline;

const ACK_TOGGLES: u8 = 6;
const ACK_PERIOD: Duration = Duration::from_millis(100);

pub struct StatusIndicator<P> {
    pin: Option<P>,
    blink: Duration,
    joined: bool,
    lit: bool,
    ack_remaining: u8,
    timer: Deadline,
}

impl<P: OutputPin> StatusIndicator<P> {
    /// Starts in the not-joined state with the first toggle due at `now`.
    pub fn new(pin: Option<P>, blink: Duration, now: Instant) -> Self {
        let mut led = Self {
            pin,
            blink,
            joined: false,
            lit: false,
            ack_remaining: 0,
            timer: Deadline::idle(),
        };
        led.write(false);
        led.timer.arm(now);
        led
    }

    pub fn set_joined(&mut self, joined: bool, now: Instant) {
        self.joined = joined;
        if self.ack_remaining > 0 {
            return;
        }
        if joined {
            self.timer.cancel();
            self.write(false);
        } else if !self.timer.is_armed() {
            self.timer.arm(now);
        }
    }

    /// Short burst acknowledging a factory reset.
    pub fn acknowledge_reset(&mut self, now: Instant) {
        self.ack_remaining = ACK_TOGGLES;
        self.write(false);
        self.timer.arm(now);
    }

    pub fn poll(&mut self, now: Instant) {
        let Some(due) = self.timer.fire_if_due(now) else {
            return;
        };

        if self.ack_remaining > 0 {
            self.ack_remaining -= 1;
            self.write(!self.lit);
            if self.ack_remaining > 0 {
                self.timer.arm(due + ACK_PERIOD);
                return;
            }
            self.write(false);
            if !self.joined {
                self.timer.arm(due + self.blink);
            }
            return;
        }

        if self.joined {
            self.write(false);
            return;
        }
        self.write(!self.lit);
        self.timer.arm(due + self.blink);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.at()
    }

    fn write(&mut self, on: bool) {
        self.lit = on;
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        let res = if on { pin.set_high() } else { pin.set_low() };
        if let Err(e) = res {
            warn!("status led: write failed ({:?})", e.kind());
        }
    }
}
