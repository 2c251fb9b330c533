//! Firmware error types.
//!
//! Bring-up failures are split per subsystem so the boot log names the
//! exact peripheral that failed. Runtime actuator failures are `Copy` so
//! they can be returned from the dimmer and logged by the worker without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Bring-up errors
// ---------------------------------------------------------------------------

/// One of the three H-bridge control outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveLine {
    /// AIN1: drives strip half A when high.
    Line1,
    /// AIN2: drives strip half B when high.
    Line2,
    /// STBY: H-bridge enable (low = standby).
    Enable,
}

impl fmt::Display for DriveLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line1 => write!(f, "AIN1"),
            Self::Line2 => write!(f, "AIN2"),
            Self::Enable => write!(f, "STBY"),
        }
    }
}

/// Peripheral initialisation failure.
///
/// Everything except [`InitError::Adc`] and [`InitError::StatusLed`] aborts
/// boot; those two only disable battery reporting and the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// LEDC timer or channel for the strip PWM could not be configured.
    Pwm(i32),
    /// An H-bridge output pin could not be configured.
    DriveLine(DriveLine, i32),
    /// Button input or its edge interrupt could not be configured.
    Button(i32),
    /// Status LED output could not be configured.
    StatusLed(i32),
    /// Battery ADC unit or channel could not be configured.
    Adc(i32),
    /// The polarity timer could not be created.
    Timer(i32),
}

impl InitError {
    /// Whether boot must stop on this error.
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Adc(_) | Self::StatusLed(_))
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pwm(rc) => write!(f, "PWM not ready (rc={})", rc),
            Self::DriveLine(line, rc) => write!(f, "H-bridge {} not ready (rc={})", line, rc),
            Self::Button(rc) => write!(f, "button not ready (rc={})", rc),
            Self::StatusLed(rc) => write!(f, "status LED not ready (rc={})", rc),
            Self::Adc(rc) => write!(f, "battery ADC not ready (rc={})", rc),
            Self::Timer(rc) => write!(f, "polarity timer not ready (rc={})", rc),
        }
    }
}

impl std::error::Error for InitError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}
