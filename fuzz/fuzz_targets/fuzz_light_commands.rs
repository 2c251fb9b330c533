//! Fuzz target: `LightService` command and button sequences
//!
//! Each input byte becomes a command, a button edge or a clock advance.
//! After every step:
//! - The strip is lit exactly when the H-bridge alternates
//! - The driven level never exceeds full
//!
//! cargo fuzz run fuzz_light_commands

#![no_main]

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use copper_light::adapters::nvs::NvsAdapter;
use copper_light::app::commands::LightCommand;
use copper_light::app::events::LightEvent;
use copper_light::app::ports::{EventSink, NetworkPort, PolarityControl};
use copper_light::app::service::LightService;
use copper_light::config::LightConfig;
use copper_light::light::Level;
use copper_light::light::effect::EffectKind;
use copper_light::light::startup::LightState;
use copper_light::sensors::battery::BatterySample;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use libfuzzer_sys::fuzz_target;

struct Pwm;

impl pwm::ErrorType for Pwm {
    type Error = Infallible;
}

impl SetDutyCycle for Pwm {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Bridge(Rc<Cell<bool>>);

impl PolarityControl for Bridge {
    fn start(&mut self) {
        self.0.set(true);
    }

    fn stop(&mut self) {
        self.0.set(false);
    }

    fn is_running(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Default)]
struct Button(Rc<Cell<bool>>);

impl digital::ErrorType for Button {
    type Error = Infallible;
}

impl InputPin for Button {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
}

struct Led;

impl digital::ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Default)]
struct Net(bool);

impl NetworkPort for Net {
    fn is_joined(&self) -> bool {
        self.0
    }

    fn publish_state(&mut self, _on: bool, _level: Level) {}

    fn report_battery(&mut self, _sample: &BatterySample) {}

    fn leave_network(&mut self) {
        self.0 = false;
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &LightEvent) {}
}

fn command(op: u8, arg: u8) -> LightCommand {
    match op % 7 {
        0 => LightCommand::SetLevel(Level::new(arg)),
        1 => LightCommand::SetOnOff(arg & 1 == 1),
        2 => LightCommand::Identify(EffectKind::from_zcl(arg)),
        3 => LightCommand::NetworkJoined,
        4 => LightCommand::NetworkLeft,
        5 => LightCommand::SetOnOffTransition(u16::from(arg) * 3),
        _ => LightCommand::SetOnOff(false),
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new() else {
        return;
    };
    let bridge = Bridge::default();
    let button = Button::default();
    let mut net = Net::default();
    let mut sink = Discard;
    let mut now = Instant::from_millis(0);

    let mut light = LightService::new(
        LightConfig::default(),
        Pwm,
        bridge.clone(),
        button.clone(),
        Some(Led),
        now,
    );
    light.start(LightState::default(), &mut sink);

    for pair in data.chunks(2) {
        let op = pair[0];
        let arg = pair.get(1).copied().unwrap_or(0);
        match op >> 6 {
            0 | 1 => light.handle(command(op, arg), now, &mut nvs, &mut sink),
            2 => {
                button.0.set(!button.0.get());
                light.on_button_edge(now);
            }
            _ => {
                let end = now + Duration::from_millis(u64::from(arg) * 20);
                while let Some(at) = light.next_deadline() {
                    if at > end {
                        break;
                    }
                    now = now.max(at);
                    light.poll(now, &mut nvs, &mut net, &mut sink);
                }
                now = end;
            }
        }

        assert_eq!(light.output() > Level::OFF, bridge.0.get());
        assert!(light.output() <= Level::MAX);
    }
});
