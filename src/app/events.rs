//! Outbound application events.
//!
//! The [`LightService`](super::service::LightService) and the battery
//! monitor emit these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters decide what to do with them.

use crate::app::ports::AdcError;
use crate::error::ActuatorError;
use crate::light::Level;
use crate::light::effect::EffectKind;
use crate::sensors::battery::BatterySample;

/// What caused an on/off or level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Network,
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightEvent {
    /// Startup output resolved and committed.
    Started { on: bool, level: Level },

    /// The on/off or level attribute changed.
    StateChanged {
        on: bool,
        level: Level,
        source: ChangeSource,
    },

    EffectStarted(EffectKind),

    /// Effect ended; attributes re-asserted.
    EffectFinished,

    /// Long press detected.
    FactoryReset { left_network: bool },

    NetworkJoined,
    NetworkLeft,

    /// Configuration changed and was persisted (or not).
    ConfigUpdated { persisted: bool },

    /// The dimmer could not write the requested output.
    OutputFault(ActuatorError),

    /// New battery sample; `reported` is false while not joined.
    BatterySampled {
        sample: BatterySample,
        reported: bool,
    },

    BatteryReadFailed(AdcError),
}
