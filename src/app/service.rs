//! Light service: the hexagonal core.
//!
//! [`LightService`] owns the dimmer, fade engine, effect sequencer, button
//! detector and status indicator together with the on/off and level
//! attributes. It runs on a single worker; every mutation of those
//! attributes goes through [`handle`](LightService::handle) or
//! [`poll`](LightService::poll). Storage, network and event ports are
//! injected at call sites.
//!
//! ```text
//!  LightCommand ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!  button edges ──▶ │       LightService         │ ──▶ NetworkPort
//!                   │ Fade · Effect · Button     │ ──▶ StoragePort / ConfigPort
//!                   └─────────────┬─────────────┘
//!                                 ▼
//!                         Dimmer ──▶ PolarityControl
//! ```
//!
//! ## Output ownership
//!
//! While an identify effect runs it owns the visible output. Commands and
//! button toggles still update (and persist) the attributes but do not
//! drive the strip; when the effect ends the attributes are re-committed.

use embassy_time::Instant;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::config::LightConfig;
use crate::drivers::button::{ButtonDetector, ButtonIntent};
use crate::drivers::status_led::StatusIndicator;
use crate::light::Level;
use crate::light::brightness::Dimmer;
use crate::light::effect::{EffectKind, EffectOutput, EffectSequencer};
use crate::light::startup::{self, LightState, StartupPolicy};
use crate::light::transition::Fade;
use crate::timer::earliest;

use super::commands::LightCommand;
use super::events::{ChangeSource, LightEvent};
use super::ports::{ConfigPort, EventSink, NetworkPort, PolarityControl, StoragePort};
use super::settings;

pub struct LightService<P, H, B, S> {
    config: LightConfig,
    dimmer: Dimmer<P, H>,
    fade: Fade,
    effect: EffectSequencer,
    button: ButtonDetector<B>,
    status: StatusIndicator<S>,
    state: LightState,
    /// Level to return to when switched on from off.
    last_non_zero: Level,
    joined: bool,
}

impl<P, H, B, S> LightService<P, H, B, S>
where
    P: SetDutyCycle,
    H: PolarityControl,
    B: InputPin,
    S: OutputPin,
{
    /// Build the service. Nothing is driven until [`start`](Self::start).
    pub fn new(
        config: LightConfig,
        pwm: P,
        bridge: H,
        button_pin: B,
        status_pin: Option<S>,
        now: Instant,
    ) -> Self {
        let button = ButtonDetector::new(button_pin, config.debounce(), config.long_press());
        let status = StatusIndicator::new(status_pin, config.status_blink(), now);
        Self {
            fade: Fade::new(config.fade_step_ms),
            config,
            dimmer: Dimmer::new(pwm, bridge),
            effect: EffectSequencer::new(),
            button,
            status,
            state: LightState::default(),
            last_non_zero: Level::MAX,
            joined: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Resolve the startup policy against the persisted attributes and
    /// commit the result once.
    pub fn start(&mut self, persisted: LightState, sink: &mut impl EventSink) {
        self.state = startup::resolve(self.config.startup, persisted);
        if !self.state.level.is_off() {
            self.last_non_zero = self.state.level;
        }
        self.drive(self.state.output(), sink);
        info!(
            "light: started on={} level={} (policy {:?})",
            self.state.on, self.state.level, self.config.startup
        );
        sink.emit(&LightEvent::Started {
            on: self.state.on,
            level: self.state.level,
        });
    }

    // ── Commands ──────────────────────────────────────────────

    pub fn handle(
        &mut self,
        cmd: LightCommand,
        now: Instant,
        store: &mut (impl StoragePort + ConfigPort),
        sink: &mut impl EventSink,
    ) {
        match cmd {
            LightCommand::SetLevel(level) => {
                self.state.level = level;
                self.state.on = !level.is_off();
                if !level.is_off() {
                    self.last_non_zero = level;
                }
                self.apply_instant(store, sink, ChangeSource::Network);
            }
            LightCommand::SetOnOff(on) => {
                if on {
                    let target = self.on_level(self.state.level, self.last_non_zero);
                    self.state.level = target;
                    self.last_non_zero = target;
                }
                self.state.on = on;
                self.apply_instant(store, sink, ChangeSource::Network);
            }
            LightCommand::Identify(kind) => self.identify(kind, now, sink),
            LightCommand::NetworkJoined => {
                self.set_joined(true, now);
                sink.emit(&LightEvent::NetworkJoined);
            }
            LightCommand::NetworkLeft => {
                self.set_joined(false, now);
                sink.emit(&LightEvent::NetworkLeft);
            }
            LightCommand::SetOnOffTransition(ds) => {
                let mut next = self.config.clone();
                next.on_off_transition_ds = ds;
                self.update_config(next, &*store, sink);
            }
            LightCommand::SetStartupPolicy(policy) => {
                let mut next = self.config.clone();
                next.startup = policy;
                self.update_config(next, &*store, sink);
            }
        }
    }

    /// A batch of raw button edges was latched by the ISR.
    pub fn on_button_edge(&mut self, now: Instant) {
        self.button.on_edge(now);
    }

    // ── Timers ────────────────────────────────────────────────

    /// Run every deadline that is due at `now`.
    pub fn poll(
        &mut self,
        now: Instant,
        store: &mut impl StoragePort,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) {
        match self.button.poll(now) {
            Some(ButtonIntent::Toggle) => self.toggle(now, store, net, sink),
            Some(ButtonIntent::FactoryReset) => self.factory_reset(now, net, sink),
            None => {}
        }

        match self.effect.poll(now) {
            Some(EffectOutput::Show(level)) => self.drive(level, sink),
            Some(EffectOutput::Restore) => {
                self.drive(self.state.output(), sink);
                sink.emit(&LightEvent::EffectFinished);
            }
            None => {}
        }

        if let Some(level) = self.fade.poll(now) {
            self.drive(level, sink);
        }

        self.status.poll(now);
    }

    /// Earliest armed deadline, for the worker's sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        let light = earliest(self.fade.next_deadline(), self.effect.next_deadline());
        let inputs = earliest(self.button.next_deadline(), self.status.next_deadline());
        earliest(light, inputs)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LightState {
        self.state
    }

    /// Level currently driven on the strip.
    pub fn output(&self) -> Level {
        self.dimmer.level()
    }

    pub fn last_non_zero(&self) -> Level {
        self.last_non_zero
    }

    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    pub fn startup_policy(&self) -> StartupPolicy {
        self.config.startup
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_active()
    }

    pub fn active_effect(&self) -> Option<EffectKind> {
        self.effect.kind()
    }

    pub fn dimmer(&self) -> &Dimmer<P, H> {
        &self.dimmer
    }

    pub fn status_lit(&self) -> bool {
        self.status.is_lit()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Level to show when switching on: the current level if non-zero,
    /// then the remembered one, then full.
    fn on_level(&self, first: Level, second: Level) -> Level {
        [first, second]
            .into_iter()
            .find(|l| !l.is_off())
            .unwrap_or(Level::MAX)
    }

    fn apply_instant(
        &mut self,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
        source: ChangeSource,
    ) {
        self.fade.cancel();
        if !self.effect.is_active() {
            self.drive(self.state.output(), sink);
        }
        self.persist(store);
        self.emit_state(sink, source);
    }

    fn toggle(
        &mut self,
        now: Instant,
        store: &mut impl StoragePort,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) {
        if self.state.on {
            self.state.on = false;
        } else {
            let target = self.on_level(self.last_non_zero, self.state.level);
            self.state.on = true;
            self.state.level = target;
            self.last_non_zero = target;
        }
        info!("light: button toggle -> on={} level={}", self.state.on, self.state.level);

        if self.effect.is_active() {
            self.fade.cancel();
        } else if let Some(level) = self.fade.fade_to(
            self.dimmer.level(),
            self.state.output(),
            self.config.on_off_fade_ms(),
            now,
        ) {
            self.drive(level, sink);
        }

        net.publish_state(self.state.on, self.state.level);
        self.persist(store);
        self.emit_state(sink, ChangeSource::Button);
    }

    fn factory_reset(&mut self, now: Instant, net: &mut impl NetworkPort, sink: &mut impl EventSink) {
        self.status.acknowledge_reset(now);
        let left_network = net.is_joined();
        if left_network {
            net.leave_network();
        }
        warn!("light: factory reset (left network: {})", left_network);
        sink.emit(&LightEvent::FactoryReset { left_network });
    }

    fn identify(&mut self, kind: EffectKind, now: Instant, sink: &mut impl EventSink) {
        self.fade.cancel();
        match self.effect.start(kind, now) {
            Some(EffectOutput::Show(level)) => {
                self.drive(level, sink);
                sink.emit(&LightEvent::EffectStarted(kind));
            }
            Some(EffectOutput::Restore) => {
                self.drive(self.state.output(), sink);
                sink.emit(&LightEvent::EffectFinished);
            }
            // Stop / Finish with nothing running: settle any cancelled fade
            // onto the attributes.
            None => self.drive(self.state.output(), sink),
        }
    }

    fn set_joined(&mut self, joined: bool, now: Instant) {
        self.joined = joined;
        self.status.set_joined(joined, now);
    }

    fn update_config(
        &mut self,
        next: LightConfig,
        store: &impl ConfigPort,
        sink: &mut impl EventSink,
    ) {
        if let Err(e) = next.validate() {
            warn!("light: rejected config update: {}", e);
            return;
        }
        let persisted = match store.save(&next) {
            Ok(()) => true,
            Err(e) => {
                warn!("light: config save failed: {}", e);
                false
            }
        };
        self.config = next;
        sink.emit(&LightEvent::ConfigUpdated { persisted });
    }

    fn drive(&mut self, level: Level, sink: &mut impl EventSink) {
        if let Err(e) = self.dimmer.commit(level) {
            sink.emit(&LightEvent::OutputFault(e));
        }
    }

    fn persist(&self, store: &mut impl StoragePort) {
        if let Err(e) = settings::save(store, self.state) {
            warn!("light: persisting state failed: {}", e);
        }
    }

    fn emit_state(&self, sink: &mut impl EventSink, source: ChangeSource) {
        sink.emit(&LightEvent::StateChanged {
            on: self.state.on,
            level: self.state.level,
            source,
        });
    }
}
