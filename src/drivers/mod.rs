//! Input/indicator drivers, board bring-up and the polarity timer.

pub mod button;
pub mod status_led;

#[cfg(target_os = "espidf")]
pub mod hw_init;
#[cfg(target_os = "espidf")]
pub mod hw_timer;
