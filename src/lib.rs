//! Copper Light firmware library.
//!
//! Exposes the light engine for integration testing. Everything that
//! touches ESP-IDF is guarded by `#[cfg(target_os = "espidf")]`, so the
//! crate builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod light;
pub mod pins;
pub mod sensors;
pub mod timer;
