//! GPIO / peripheral assignments for the ESP32-C6 light board.
//!
//! Single source of truth for pin numbers and fixed peripheral settings.
//! The board bring-up takes the typed pins that match these numbers and
//! uses the raw values for the ISR and ADC calls. The battery front-end
//! constants also feed the host-side [`LightConfig`](crate::config::LightConfig)
//! defaults.

// ---------------------------------------------------------------------------
// TB6612 H-bridge (channel A drives the center-tapped strip)
// ---------------------------------------------------------------------------

/// LEDC PWM output to PWMA: brightness.
pub const PWM_GPIO: i32 = 2;
/// AIN1: asserted in phase A.
pub const AIN1_GPIO: i32 = 3;
/// AIN2: asserted in phase B.
pub const AIN2_GPIO: i32 = 4;
/// STBY: HIGH = bridge enabled, LOW = standby.
pub const STBY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User interface
// ---------------------------------------------------------------------------

/// Momentary button, active-low with internal pull-up (BOOT on the devkit).
pub const BUTTON_GPIO: i32 = 9;
/// Single status LED, active HIGH.
pub const STATUS_LED_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Battery sense (ADC1, resistive divider)
// ---------------------------------------------------------------------------

/// ADC1 channel 0 = GPIO 0 on the C6.
pub const BATTERY_ADC_CHANNEL: u32 = 0;
/// ADC1 input span at `ADC_ATTEN_DB_12`.
pub const ADC_RANGE_MV: u32 = 3_300;
/// Counts at full scale with `ADC_BITWIDTH_12`.
pub const ADC_RESOLUTION: u32 = 4_096;
/// Cell-to-pin ratio: two equal resistors, so the pin sees half the cell.
pub const BATTERY_DIVIDER: u32 = 2;
/// Cell millivolts represented by a full-scale reading.
pub const BATTERY_FULL_SCALE_MV: u32 = ADC_RANGE_MV * BATTERY_DIVIDER;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC carrier for PWMA. 1 kHz is well inside the TB6612 switching range.
pub const PWM_FREQ_HZ: u32 = 1_000;
