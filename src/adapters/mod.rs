//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `log_sink` | EventSink          | Serial log output            |
//! | `network`  | NetworkPort        | Mesh stack attribute layer   |
//! | `nvs`      | ConfigPort         | NVS / in-memory store        |
//! |            | StoragePort        |                              |
//! | `time`     | (clock source)     | ESP32 system timer           |
//!
//! The H-bridge timer and battery ADC adapters live in
//! [`drivers`](crate::drivers) next to the rest of the board bring-up.

pub mod log_sink;
pub mod network;
pub mod nvs;
pub mod time;
