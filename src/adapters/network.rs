//! Mesh network attribute-layer adapter.
//!
//! Implements [`NetworkPort`] (outbound) and translates inbound cluster
//! writes into [`LightCommand`]s posted on the
//! [`COMMANDS`](crate::events::COMMANDS) queue.
//!
//! The protocol stack itself (commissioning, cluster registry, wire
//! encoding) lives outside this crate. This adapter is the seam: the
//! stack's callbacks call the `on_*` methods; the light worker and the
//! battery thread hold clones and call the [`NetworkPort`] methods.
//!
//! ## Caller boundary
//!
//! Raw attribute values are range-checked here: levels above 254 are
//! clamped and unknown enum codes map through the `from_zcl` helpers. The
//! light engine assumes validated input.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::app::commands::LightCommand;
use crate::app::ports::NetworkPort;
use crate::events::{COMMAND_DEPTH, CommandQueue};
use crate::light::Level;
use crate::light::effect::EffectKind;
use crate::light::startup::{LevelStartup, OnOffStartup, StartupPolicy};
use crate::sensors::battery::BatterySample;

/// Shared network handle. Cheap to clone; all clones see the same joined
/// flag.
#[derive(Clone)]
pub struct NetworkLink {
    joined: Arc<AtomicBool>,
    commands: &'static CommandQueue<COMMAND_DEPTH>,
}

impl NetworkLink {
    pub fn new(commands: &'static CommandQueue<COMMAND_DEPTH>) -> Self {
        Self {
            joined: Arc::new(AtomicBool::new(false)),
            commands,
        }
    }

    // ── Inbound (stack callbacks) ─────────────────────────────

    /// Steering / rejoin completed.
    pub fn on_joined(&self) {
        if !self.joined.swap(true, Ordering::AcqRel) {
            info!("network: joined");
            self.commands.post(LightCommand::NetworkJoined);
        }
    }

    pub fn on_left(&self) {
        if self.joined.swap(false, Ordering::AcqRel) {
            info!("network: left");
            self.commands.post(LightCommand::NetworkLeft);
        }
    }

    /// Level Control CurrentLevel write. Values above 254 are clamped.
    pub fn on_level_write(&self, raw: u8) -> bool {
        self.commands.post(LightCommand::SetLevel(Level::new(raw)))
    }

    pub fn on_on_off_write(&self, on: bool) -> bool {
        self.commands.post(LightCommand::SetOnOff(on))
    }

    /// Identify TriggerEffect with the raw effect identifier.
    pub fn on_identify_effect(&self, effect_id: u8) -> bool {
        self.commands
            .post(LightCommand::Identify(EffectKind::from_zcl(effect_id)))
    }

    /// OnOffTransitionTime write, tenths of a second.
    pub fn on_transition_time_write(&self, ds: u16) -> bool {
        self.commands.post(LightCommand::SetOnOffTransition(ds))
    }

    /// StartUpOnOff / StartUpCurrentLevel writes, raw codes.
    pub fn on_startup_write(&self, on_off: u8, level: u8) -> bool {
        self.commands.post(LightCommand::SetStartupPolicy(StartupPolicy {
            on_off: OnOffStartup::from_zcl(on_off),
            level: LevelStartup::from_zcl(level),
        }))
    }
}

impl NetworkPort for NetworkLink {
    fn is_joined(&self) -> bool {
        self.joined.load(Ordering::Acquire)
    }

    fn publish_state(&mut self, on: bool, level: Level) {
        if !self.is_joined() {
            return;
        }
        info!("network: attr on_off={} current_level={}", on, level);
    }

    fn report_battery(&mut self, sample: &BatterySample) {
        if !self.is_joined() {
            return;
        }
        info!(
            "network: attr battery_voltage={} battery_percentage_remaining={}",
            sample.voltage_attr(),
            sample.percentage_attr()
        );
    }

    fn leave_network(&mut self) {
        info!("network: leave requested, restarting commissioning");
        self.on_left();
    }
}
