//! Perceptual brightness mapping and the committed-output owner.
//!
//! The eye responds roughly logarithmically to luminous flux, so a linear
//! duty ramp looks like it jumps at the bottom and stalls at the top. The
//! table below is the CIE 1931 lightness curve sampled at 256 points and
//! scaled to `0..=255`; indices above 254 are unreachable through
//! [`Level`] but kept so the table reads as the full curve.

use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::{debug, error};

use crate::app::ports::PolarityControl;
use crate::error::ActuatorError;

use super::Level;

#[rustfmt::skip]
pub const CIE1931: [u8; 256] = [
    0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 4,
    4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 7,
    7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 10, 10, 10, 10, 11, 11,
    11, 12, 12, 12, 13, 13, 13, 14, 14, 15, 15, 15, 16, 16, 17, 17,
    17, 18, 18, 19, 19, 20, 20, 21, 21, 22, 22, 23, 23, 24, 24, 25,
    25, 26, 26, 27, 28, 28, 29, 29, 30, 31, 31, 32, 32, 33, 34, 34,
    35, 36, 37, 37, 38, 39, 39, 40, 41, 42, 43, 43, 44, 45, 46, 47,
    47, 48, 49, 50, 51, 52, 53, 54, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 70, 71, 72, 73, 74, 75, 76, 77, 79,
    80, 81, 82, 83, 85, 86, 87, 88, 90, 91, 92, 94, 95, 96, 98, 99,
    100, 102, 103, 105, 106, 108, 109, 110, 112, 113, 115, 116, 118, 120, 121, 123,
    124, 126, 128, 129, 131, 132, 134, 136, 138, 139, 141, 143, 145, 146, 148, 150,
    152, 154, 155, 157, 159, 161, 163, 165, 167, 169, 171, 173, 175, 177, 179, 181,
    183, 185, 187, 189, 191, 193, 196, 198, 200, 202, 204, 207, 209, 211, 214, 216,
    218, 220, 223, 225, 228, 230, 232, 235, 237, 240, 242, 245, 247, 250, 252, 255,
];

/// `CIE1931[level] * period / 255`.
pub fn map_to_duty(level: Level, period: u16) -> u16 {
    let corrected = u32::from(CIE1931[usize::from(level.get())]);
    (corrected * u32::from(period) / 255) as u16
}

/// Owns the PWM channel and the polarity sequencer, and remembers the last
/// level actually written.
pub struct Dimmer<P, H> {
    pwm: P,
    bridge: H,
    committed: Level,
    duty: u16,
}

impl<P: SetDutyCycle, H: PolarityControl> Dimmer<P, H> {
    /// Starts dark with the bridge stopped; call [`commit`](Self::commit)
    /// once the startup level is known.
    pub fn new(pwm: P, bridge: H) -> Self {
        Self {
            pwm,
            bridge,
            committed: Level::OFF,
            duty: 0,
        }
    }

    /// Write `level` to the PWM channel and start/stop polarity alternation
    /// on zero crossings.
    ///
    /// On a PWM write failure nothing else changes: the previous level stays
    /// committed and the bridge state is untouched.
    pub fn commit(&mut self, level: Level) -> Result<(), ActuatorError> {
        let duty = map_to_duty(level, self.pwm.max_duty_cycle());
        if let Err(e) = self.pwm.set_duty_cycle(duty) {
            error!("dimmer: PWM write of {} failed ({:?})", duty, e.kind());
            return Err(ActuatorError::PwmWriteFailed);
        }

        if !level.is_off() && !self.bridge.is_running() {
            self.bridge.start();
        } else if level.is_off() && self.bridge.is_running() {
            self.bridge.stop();
        }

        debug!("dimmer: level {} -> duty {}", level, duty);
        self.committed = level;
        self.duty = duty;
        Ok(())
    }

    /// Last level successfully written.
    pub fn level(&self) -> Level {
        self.committed
    }

    /// Last duty value successfully written.
    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn bridge(&self) -> &H {
        &self.bridge
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
