//! Port traits: the hexagonal boundary between the light engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LightService (domain)
//! ```
//!
//! PWM and GPIO go through the `embedded-hal` 1.0 traits directly; the
//! ports below cover the collaborators that have no standard trait: the
//! polarity sequencer, its periodic timer, the battery ADC, the network
//! attribute layer, persistence and event output.

use embassy_time::Duration;

use crate::config::LightConfig;
use crate::light::Level;
use crate::sensors::battery::BatterySample;

// ───────────────────────────────────────────────────────────────
// Polarity control (domain → H-bridge sequencer)
// ───────────────────────────────────────────────────────────────

/// Start/stop control of the H-bridge polarity alternation.
///
/// The dimmer calls [`start`](Self::start) when output leaves zero and
/// [`stop`](Self::stop) when it returns to zero.
pub trait PolarityControl {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Periodic timer driving the polarity flip callback.
pub trait TickTimer {
    /// Arm (or re-arm) the periodic callback.
    fn arm_periodic(&mut self, period: Duration) -> Result<(), TimerError>;

    /// Disarm. A callback already in flight may still complete.
    fn disarm(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Battery ADC (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One-shot read of the battery divider channel.
pub trait BatteryAdc {
    /// Raw conversion result, `0..resolution`.
    fn read_raw(&mut self) -> Result<u16, AdcError>;
}

// ───────────────────────────────────────────────────────────────
// Network attribute layer (domain → mesh stack)
// ───────────────────────────────────────────────────────────────

/// The subset of the mesh network stack the light engine talks to.
///
/// Inbound traffic (level / on-off writes, join events) arrives as
/// [`LightCommand`](super::commands::LightCommand)s; this port covers the
/// outbound direction.
pub trait NetworkPort {
    fn is_joined(&self) -> bool;

    /// Push local on/off + level changes (button toggles) to the attribute
    /// table so the coordinator sees them.
    fn publish_state(&mut self, on: bool, level: Level);

    /// Report battery voltage / percentage attributes.
    fn report_battery(&mut self, sample: &BatterySample);

    /// Leave the network and restart commissioning.
    fn leave_network(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`LightEvent`](super::events::LightEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LightEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the light configuration.
///
/// Implementations MUST call [`LightConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Returns [`LightConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<LightConfig, ConfigError>;

    fn save(&self, config: &LightConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Keys are namespaced to prevent collisions between subsystems. Writes
/// MUST be atomic; the ESP-IDF NVS API guarantees this per commit.
pub trait StoragePort {
    /// Read a value into `buf`. Returns the *stored* length, which may
    /// exceed `buf.len()`; only `min(stored, buf.len())` bytes are copied.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`BatteryAdc`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    /// The conversion call itself failed.
    ReadFailed(i32),
    /// The conversion returned zero, which the divider can never produce
    /// with a battery attached.
    ZeroReading,
}

/// Errors from [`TickTimer`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerError(pub i32);

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for AdcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ReadFailed(rc) => write!(f, "ADC read failed (rc={})", rc),
            Self::ZeroReading => write!(f, "ADC returned zero"),
        }
    }
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "timer error (rc={})", self.0)
    }
}
