//! Light control engine.
//!
//! ```text
//!  LightCommand / ButtonIntent
//!            │
//!            ▼
//!   ┌──────────────────┐    ┌──────────────────┐
//!   │ transition::Fade │    │ effect::Effect-  │
//!   │  (20 ms steps)   │    │   Sequencer      │
//!   └────────┬─────────┘    └────────┬─────────┘
//!            │   startup::resolve    │
//!            ▼          │            ▼
//!   ┌──────────────────────────────────────────┐
//!   │ brightness::Dimmer  (CIE1931 → PWM duty) │
//!   └────────────────────┬─────────────────────┘
//!                        │ 0 ↔ non-zero crossings
//!                        ▼
//!   ┌──────────────────────────────────────────┐
//!   │ polarity::PolarityAlternator (TB6612)    │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! The fade and effect engines never touch hardware. They return the
//! level to commit and the owning service passes it to the dimmer.

pub mod brightness;
pub mod effect;
pub mod polarity;
pub mod startup;
pub mod transition;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Network-facing brightness, `0..=254`. Zero is off.
///
/// Construction clamps, so a `Level` is always in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Level(u8);

impl Level {
    pub const OFF: Self = Self(0);
    /// Floor used by the "minimum" startup policy.
    pub const MIN_ON: Self = Self(1);
    /// Full brightness. Also the turn-on default when no previous level exists.
    pub const MAX: Self = Self(254);

    pub const fn new(raw: u8) -> Self {
        if raw > Self::MAX.0 { Self::MAX } else { Self(raw) }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_off(self) -> bool {
        self.0 == 0
    }
}

impl From<u8> for Level {
    fn from(raw: u8) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_clamps_to_254() {
        assert_eq!(Level::new(255).get(), 254);
        assert_eq!(Level::new(254).get(), 254);
        assert_eq!(Level::new(0), Level::OFF);
    }

    #[test]
    fn off_is_zero_only() {
        assert!(Level::OFF.is_off());
        assert!(!Level::MIN_ON.is_off());
    }
}
