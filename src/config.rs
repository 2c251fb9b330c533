//! Light configuration parameters.
//!
//! Compiled-in defaults match the board; the startup policy and on/off
//! transition time can be changed over the network and are persisted as a
//! postcard blob (see [`NvsAdapter`](crate::adapters::nvs::NvsAdapter)).

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::light::startup::StartupPolicy;
use crate::pins;

/// Fade length used for on/off when the transition time attribute is 0.
pub const DEFAULT_ON_OFF_FADE_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightConfig {
    // --- H-bridge ---
    /// Full polarity cycles per second (both halves lit once each).
    pub polarity_freq_hz: u16,

    // --- Transitions ---
    /// Fade step cadence (milliseconds).
    pub fade_step_ms: u16,
    /// On/off fade length in tenths of a second (ZCL OnOffTransitionTime).
    pub on_off_transition_ds: u16,

    // --- Button ---
    /// Hold time that turns a press into a factory reset (milliseconds).
    pub long_press_ms: u32,
    /// Settle window after the last edge before the level is sampled.
    pub debounce_ms: u16,

    // --- Battery ---
    /// Sampling and report period (seconds).
    pub battery_interval_secs: u32,
    /// Millivolts represented by a full-scale ADC reading, including the
    /// divider and attenuation of the front end.
    pub battery_full_scale_mv: u32,
    /// ADC resolution (counts at full scale).
    pub adc_resolution: u32,

    // --- Status LED ---
    /// Toggle period while not joined (milliseconds).
    pub status_blink_ms: u16,

    // --- Boot ---
    pub startup: StartupPolicy,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            polarity_freq_hz: 100,

            fade_step_ms: 20, // ~50 Hz visual update
            on_off_transition_ds: 10, // 1 s

            long_press_ms: 3000,
            debounce_ms: 50,

            battery_interval_secs: 3600,
            battery_full_scale_mv: pins::BATTERY_FULL_SCALE_MV,
            adc_resolution: pins::ADC_RESOLUTION,

            status_blink_ms: 500,

            startup: StartupPolicy::default(),
        }
    }
}

impl LightConfig {
    /// Range-check every field. Called before persisting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(50..=1000).contains(&self.polarity_freq_hz) {
            return Err(ConfigError::ValidationFailed(
                "polarity_freq_hz must be 50-1000",
            ));
        }
        if !(5..=100).contains(&self.fade_step_ms) {
            return Err(ConfigError::ValidationFailed("fade_step_ms must be 5-100"));
        }
        if self.on_off_transition_ds > 600 {
            return Err(ConfigError::ValidationFailed(
                "on_off_transition_ds must be 0-600",
            ));
        }
        if !(500..=30_000).contains(&self.long_press_ms) {
            return Err(ConfigError::ValidationFailed(
                "long_press_ms must be 500-30000",
            ));
        }
        if u32::from(self.debounce_ms) >= self.long_press_ms {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must be < long_press_ms",
            ));
        }
        if !(60..=86_400).contains(&self.battery_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "battery_interval_secs must be 60-86400",
            ));
        }
        if self.adc_resolution == 0 || self.battery_full_scale_mv == 0 {
            return Err(ConfigError::ValidationFailed(
                "battery scale and ADC resolution must be non-zero",
            ));
        }
        if !(50..=5000).contains(&self.status_blink_ms) {
            return Err(ConfigError::ValidationFailed(
                "status_blink_ms must be 50-5000",
            ));
        }
        Ok(())
    }

    /// On/off fade length; an unset (zero) transition time means 1 s.
    pub fn on_off_fade_ms(&self) -> u32 {
        match u32::from(self.on_off_transition_ds) * 100 {
            0 => DEFAULT_ON_OFF_FADE_MS,
            ms => ms,
        }
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(u64::from(self.long_press_ms))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_ms))
    }

    pub fn battery_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.battery_interval_secs))
    }

    pub fn status_blink(&self) -> Duration {
        Duration::from_millis(u64::from(self.status_blink_ms))
    }
}
