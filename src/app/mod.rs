//! Application core: domain logic with no direct I/O.
//!
//! The light service orchestrates the fade, effect, button and status
//! state machines. All interaction with hardware and the network stack
//! happens through the `embedded-hal` traits and the **port traits** in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod settings;
