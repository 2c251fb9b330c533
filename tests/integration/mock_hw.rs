//! Mock hardware and ports for integration tests.
//!
//! Every mock hands out a cloneable probe so tests can keep observing the
//! hardware after ownership moves into the [`LightService`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use copper_light::app::commands::LightCommand;
use copper_light::app::events::LightEvent;
use copper_light::app::ports::{
    ConfigError, ConfigPort, EventSink, NetworkPort, PolarityControl, StorageError, StoragePort,
};
use copper_light::app::service::LightService;
use copper_light::config::LightConfig;
use copper_light::light::Level;
use copper_light::light::startup::LightState;
use copper_light::sensors::battery::BatterySample;
use embassy_time::Instant;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

// ── PWM ───────────────────────────────────────────────────────

pub const MAX_DUTY: u16 = 1000;

#[derive(Clone, Default)]
pub struct MockPwm {
    pub writes: Rc<RefCell<Vec<u16>>>,
    pub fail: Rc<Cell<bool>>,
}

impl MockPwm {
    pub fn last(&self) -> Option<u16> {
        self.writes.borrow().last().copied()
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = pwm::ErrorKind;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), pwm::ErrorKind> {
        if self.fail.get() {
            return Err(pwm::ErrorKind::Other);
        }
        self.writes.borrow_mut().push(duty);
        Ok(())
    }
}

// ── H-bridge ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBridge {
    pub running: Rc<Cell<bool>>,
    pub starts: Rc<Cell<u32>>,
    pub stops: Rc<Cell<u32>>,
}

impl PolarityControl for MockBridge {
    fn start(&mut self) {
        self.running.set(true);
        self.starts.set(self.starts.get() + 1);
    }

    fn stop(&mut self) {
        self.running.set(false);
        self.stops.set(self.stops.get() + 1);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

// ── Button / LED ──────────────────────────────────────────────

/// `true` while the button is held (line pulled low).
#[derive(Clone, Default)]
pub struct MockButton(pub Rc<Cell<bool>>);

impl digital::ErrorType for MockButton {
    type Error = Infallible;
}

impl InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
}

#[derive(Clone, Default)]
pub struct MockLed {
    pub lit: Rc<Cell<bool>>,
    pub toggles: Rc<Cell<u32>>,
}

impl MockLed {
    fn set(&self, on: bool) {
        if self.lit.get() != on {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.lit.set(on);
    }
}

impl digital::ErrorType for MockLed {
    type Error = Infallible;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set(true);
        Ok(())
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub data: HashMap<String, Vec<u8>>,
    pub saved_config: RefCell<Option<LightConfig>>,
    pub fail_config_save: bool,
}

impl MockNvs {
    fn key(ns: &str, key: &str) -> String {
        format!("{}::{}", ns, key)
    }

    pub fn get(&self, ns: &str, key: &str) -> Option<&[u8]> {
        self.data.get(&Self::key(ns, key)).map(Vec::as_slice)
    }
}

impl StoragePort for MockNvs {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.data.get(&Self::key(ns, key)).ok_or(StorageError::NotFound)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(data.len())
    }

    fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.data.insert(Self::key(ns, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&Self::key(ns, key));
        Ok(())
    }

    fn exists(&self, ns: &str, key: &str) -> bool {
        self.data.contains_key(&Self::key(ns, key))
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<LightConfig, ConfigError> {
        Ok(self.saved_config.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &LightConfig) -> Result<(), ConfigError> {
        if self.fail_config_save {
            return Err(ConfigError::IoError);
        }
        config.validate()?;
        *self.saved_config.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── Network ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNetwork {
    pub joined: bool,
    pub published: Vec<(bool, Level)>,
    pub battery_reports: Vec<BatterySample>,
    pub leaves: u32,
}

impl NetworkPort for MockNetwork {
    fn is_joined(&self) -> bool {
        self.joined
    }

    fn publish_state(&mut self, on: bool, level: Level) {
        self.published.push((on, level));
    }

    fn report_battery(&mut self, sample: &BatterySample) {
        self.battery_reports.push(*sample);
    }

    fn leave_network(&mut self) {
        self.joined = false;
        self.leaves += 1;
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<LightEvent>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&LightEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LightEvent) {
        self.events.push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

pub type TestService = LightService<MockPwm, MockBridge, MockButton, MockLed>;

/// A started service plus probes and a manual clock (milliseconds).
pub struct Rig {
    pub light: TestService,
    pub pwm: MockPwm,
    pub bridge: MockBridge,
    pub button: MockButton,
    pub led: MockLed,
    pub nvs: MockNvs,
    pub net: MockNetwork,
    pub sink: RecordingSink,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: LightConfig, persisted: LightState) -> Self {
        let pwm = MockPwm::default();
        let bridge = MockBridge::default();
        let button = MockButton::default();
        let led = MockLed::default();
        let mut sink = RecordingSink::default();
        let mut light = LightService::new(
            config,
            pwm.clone(),
            bridge.clone(),
            button.clone(),
            Some(led.clone()),
            Instant::from_millis(0),
        );
        light.start(persisted, &mut sink);
        Self {
            light,
            pwm,
            bridge,
            button,
            led,
            nvs: MockNvs::default(),
            net: MockNetwork::default(),
            sink,
            now_ms: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LightConfig::default(), LightState::default())
    }

    pub fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms)
    }

    pub fn send(&mut self, cmd: LightCommand) {
        let now = self.now();
        self.light.handle(cmd, now, &mut self.nvs, &mut self.sink);
    }

    /// Run every deadline up to `now + ms`, then park the clock there.
    pub fn advance(&mut self, ms: u64) {
        let end = self.now_ms + ms;
        while let Some(at) = self.light.next_deadline() {
            let at = at.as_millis().max(self.now_ms);
            if at > end {
                break;
            }
            self.now_ms = at;
            let now = self.now();
            self.light
                .poll(now, &mut self.nvs, &mut self.net, &mut self.sink);
        }
        self.now_ms = end;
    }

    /// Physical edge: set the line and latch it like the ISR would.
    pub fn set_button(&mut self, held: bool) {
        self.button.0.set(held);
        let now = self.now();
        self.light.on_button_edge(now);
    }

    /// Press for `hold_ms`, release, and let everything settle for `after_ms`.
    pub fn press(&mut self, hold_ms: u64, after_ms: u64) {
        self.set_button(true);
        self.advance(hold_ms);
        self.set_button(false);
        self.advance(after_ms);
    }

    /// Level currently driven on the strip.
    pub fn output(&self) -> Level {
        self.light.output()
    }
}
