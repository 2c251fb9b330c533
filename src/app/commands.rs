//! Inbound commands to the light service.
//!
//! The network stack's attribute callbacks translate cluster writes into
//! these and post them on the [`COMMANDS`](crate::events::COMMANDS) queue;
//! the worker hands each one to
//! [`LightService::handle`](super::service::LightService::handle).

use crate::light::Level;
use crate::light::effect::EffectKind;
use crate::light::startup::StartupPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    /// Level Control: move to level (with on/off). Applied instantly.
    SetLevel(Level),

    /// On/Off cluster: on or off. Applied instantly.
    SetOnOff(bool),

    /// Identify cluster: trigger effect.
    Identify(EffectKind),

    /// The device joined (or rejoined) the network.
    NetworkJoined,

    /// The device left the network.
    NetworkLeft,

    /// Level Control: OnOffTransitionTime attribute write (tenths of a second).
    SetOnOffTransition(u16),

    /// StartUpOnOff / StartUpCurrentLevel attribute writes.
    SetStartupPolicy(StartupPolicy),
}
