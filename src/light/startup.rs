//! Boot-time output resolution (ZCL StartUpOnOff / StartUpCurrentLevel).

use serde::{Deserialize, Serialize};

use super::Level;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOffStartup {
    Off,
    On,
    /// Invert the persisted on/off.
    Toggle,
    #[default]
    Previous,
}

impl OnOffStartup {
    /// Reserved codes fall back to `Previous`.
    pub const fn from_zcl(code: u8) -> Self {
        match code {
            0x00 => Self::Off,
            0x01 => Self::On,
            0x02 => Self::Toggle,
            _ => Self::Previous,
        }
    }

    pub const fn to_zcl(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::On => 0x01,
            Self::Toggle => 0x02,
            Self::Previous => 0xff,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStartup {
    /// [`Level::MIN_ON`].
    Minimum,
    #[default]
    Previous,
    Specific(Level),
}

impl LevelStartup {
    pub const fn from_zcl(code: u8) -> Self {
        match code {
            0x00 => Self::Minimum,
            0xff => Self::Previous,
            v => Self::Specific(Level::new(v)),
        }
    }

    pub const fn to_zcl(self) -> u8 {
        match self {
            Self::Minimum => 0x00,
            Self::Previous => 0xff,
            Self::Specific(l) => l.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupPolicy {
    pub on_off: OnOffStartup,
    pub level: LevelStartup,
}

/// The two persisted attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub on: bool,
    pub level: Level,
}

impl Default for LightState {
    /// First boot: off, full level ready for the first turn-on.
    fn default() -> Self {
        Self {
            on: false,
            level: Level::MAX,
        }
    }
}

impl LightState {
    /// Output this state drives when no effect is running.
    pub fn output(self) -> Level {
        if self.on { self.level } else { Level::OFF }
    }
}

/// Combine the policy with the persisted attributes.
pub fn resolve(policy: StartupPolicy, persisted: LightState) -> LightState {
    let level = match policy.level {
        LevelStartup::Minimum => Level::MIN_ON,
        LevelStartup::Previous => persisted.level,
        LevelStartup::Specific(v) => v,
    };
    let on = match policy.on_off {
        OnOffStartup::Off => false,
        OnOffStartup::On => true,
        OnOffStartup::Toggle => !persisted.on,
        OnOffStartup::Previous => persisted.on,
    };
    LightState { on, level }
}
