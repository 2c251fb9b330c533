//! Network commands → LightService → dimmer / storage / events.

use copper_light::app::commands::LightCommand;
use copper_light::app::events::{ChangeSource, LightEvent};
use copper_light::config::LightConfig;
use copper_light::error::ActuatorError;
use copper_light::light::Level;
use copper_light::light::brightness::map_to_duty;
use copper_light::light::effect::EffectKind;
use copper_light::light::startup::{LevelStartup, LightState, OnOffStartup, StartupPolicy};

use crate::mock_hw::{MAX_DUTY, Rig};

fn lit(level: u8) -> LightState {
    LightState {
        on: true,
        level: Level::new(level),
    }
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn startup_previous_restores_persisted_state_with_one_write() {
    let rig = Rig::new(LightConfig::default(), lit(120));

    assert_eq!(rig.output(), Level::new(120));
    assert_eq!(*rig.pwm.writes.borrow(), vec![map_to_duty(Level::new(120), MAX_DUTY)]);
    assert!(rig.bridge.running.get());
    assert_eq!(rig.bridge.starts.get(), 1);
    assert_eq!(
        rig.sink.events,
        vec![LightEvent::Started {
            on: true,
            level: Level::new(120)
        }]
    );
}

#[test]
fn first_boot_starts_dark_with_full_level_remembered() {
    let rig = Rig::with_defaults();

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.bridge.running.get());
    assert_eq!(rig.bridge.starts.get(), 0);
    assert_eq!(rig.light.state().level, Level::MAX);
    assert_eq!(rig.light.last_non_zero(), Level::MAX);
}

#[test]
fn startup_toggle_and_specific_level_combine() {
    let mut config = LightConfig::default();
    config.startup = StartupPolicy {
        on_off: OnOffStartup::Toggle,
        level: LevelStartup::Specific(Level::new(40)),
    };
    let rig = Rig::new(
        config,
        LightState {
            on: false,
            level: Level::new(200),
        },
    );

    assert!(rig.light.state().on);
    assert_eq!(rig.output(), Level::new(40));
}

#[test]
fn startup_minimum_uses_lowest_visible_level() {
    let mut config = LightConfig::default();
    config.startup = StartupPolicy {
        on_off: OnOffStartup::On,
        level: LevelStartup::Minimum,
    };
    let rig = Rig::new(config, lit(200));

    assert_eq!(rig.output(), Level::MIN_ON);
}

// ── Level / OnOff ────────────────────────────────────────────

#[test]
fn set_level_applies_instantly_and_persists() {
    let mut rig = Rig::with_defaults();

    rig.send(LightCommand::SetLevel(Level::new(100)));

    assert_eq!(rig.output(), Level::new(100));
    assert!(!rig.light.is_fading());
    assert!(rig.bridge.running.get());
    assert_eq!(rig.nvs.get("light", "on_off"), Some(&[1u8][..]));
    assert_eq!(rig.nvs.get("light", "level"), Some(&[100u8][..]));
    assert_eq!(
        rig.sink.events.last(),
        Some(&LightEvent::StateChanged {
            on: true,
            level: Level::new(100),
            source: ChangeSource::Network,
        })
    );
}

#[test]
fn set_level_zero_switches_off_and_stops_bridge() {
    let mut rig = Rig::new(LightConfig::default(), lit(150));

    rig.send(LightCommand::SetLevel(Level::OFF));

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.light.state().on);
    assert!(!rig.bridge.running.get());
    assert_eq!(rig.bridge.stops.get(), 1);
    // Switching back on falls back to the last visible level.
    rig.send(LightCommand::SetOnOff(true));
    assert_eq!(rig.output(), Level::new(150));
}

#[test]
fn set_on_off_keeps_level_attribute() {
    let mut rig = Rig::with_defaults();
    rig.send(LightCommand::SetLevel(Level::new(80)));

    rig.send(LightCommand::SetOnOff(false));
    assert_eq!(rig.output(), Level::OFF);
    assert_eq!(rig.light.state().level, Level::new(80));
    assert_eq!(rig.nvs.get("light", "on_off"), Some(&[0u8][..]));
    assert_eq!(rig.nvs.get("light", "level"), Some(&[80u8][..]));

    rig.send(LightCommand::SetOnOff(true));
    assert_eq!(rig.output(), Level::new(80));
}

#[test]
fn switching_on_from_first_boot_uses_full_level() {
    let mut rig = Rig::with_defaults();

    rig.send(LightCommand::SetOnOff(true));

    assert_eq!(rig.output(), Level::MAX);
    assert_eq!(rig.pwm.last(), Some(map_to_duty(Level::MAX, MAX_DUTY)));
}

#[test]
fn output_is_lit_exactly_when_bridge_runs() {
    let mut rig = Rig::with_defaults();
    let script = [
        LightCommand::SetLevel(Level::new(10)),
        LightCommand::SetOnOff(false),
        LightCommand::SetOnOff(true),
        LightCommand::SetLevel(Level::MAX),
        LightCommand::SetLevel(Level::OFF),
    ];
    for cmd in script {
        rig.send(cmd);
        assert_eq!(
            !rig.output().is_off(),
            rig.bridge.running.get(),
            "after {:?}",
            cmd
        );
    }
}

// ── Identify ─────────────────────────────────────────────────

#[test]
fn blink_shows_full_then_restores_state() {
    let mut rig = Rig::new(LightConfig::default(), lit(50));

    rig.send(LightCommand::Identify(EffectKind::Blink));
    assert_eq!(rig.output(), Level::MAX);
    assert_eq!(rig.light.active_effect(), Some(EffectKind::Blink));

    rig.advance(499);
    assert_eq!(rig.output(), Level::MAX);

    rig.advance(1);
    assert_eq!(rig.output(), Level::new(50));
    assert_eq!(rig.light.active_effect(), None);
    assert_eq!(rig.sink.count(|e| *e == LightEvent::EffectFinished), 1);
    // The effect never touches the attributes.
    assert_eq!(rig.light.state(), lit(50));
}

#[test]
fn okay_alternates_and_restores_dark_light() {
    let mut rig = Rig::with_defaults();

    rig.send(LightCommand::Identify(EffectKind::Okay));
    assert_eq!(rig.output(), Level::MAX);
    rig.advance(200);
    assert_eq!(rig.output(), Level::OFF);
    rig.advance(200);
    assert_eq!(rig.output(), Level::MAX);
    rig.advance(400);

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.bridge.running.get());
    assert_eq!(rig.light.active_effect(), None);
}

#[test]
fn channel_change_holds_dim_level() {
    let mut rig = Rig::new(LightConfig::default(), lit(200));

    rig.send(LightCommand::Identify(EffectKind::ChannelChange));
    rig.advance(600);
    assert_eq!(rig.output(), Level::new(25));

    rig.advance(7400);
    assert_eq!(rig.output(), Level::new(200));
}

#[test]
fn stop_when_idle_keeps_output_and_emits_nothing() {
    let mut rig = Rig::new(LightConfig::default(), lit(70));

    rig.send(LightCommand::Identify(EffectKind::Stop));
    rig.send(LightCommand::Identify(EffectKind::Finish));

    assert_eq!(rig.output(), Level::new(70));
    assert_eq!(rig.sink.count(|e| *e == LightEvent::EffectFinished), 0);
}

#[test]
fn stop_during_fade_settles_on_attributes() {
    let mut rig = Rig::with_defaults();
    rig.press(200, 300);
    assert!(rig.light.is_fading());
    assert!(rig.output() < Level::MAX);

    rig.send(LightCommand::Identify(EffectKind::Stop));
    assert!(!rig.light.is_fading());
    assert_eq!(rig.output(), Level::MAX);

    rig.advance(5000);
    assert_eq!(rig.output(), Level::MAX);
    assert!(rig.bridge.running.get());
}

#[test]
fn finish_during_fade_off_goes_dark() {
    let mut rig = Rig::new(LightConfig::default(), lit(200));
    rig.press(200, 300);
    assert!(!rig.light.state().on);
    assert!(rig.output() > Level::OFF, "still fading down");

    rig.send(LightCommand::Identify(EffectKind::Finish));

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.bridge.running.get());
    rig.advance(5000);
    assert_eq!(rig.output(), Level::OFF);
}

#[test]
fn stop_cancels_running_effect_immediately() {
    let mut rig = Rig::new(LightConfig::default(), lit(70));
    rig.send(LightCommand::Identify(EffectKind::Breathe));
    rig.advance(1200);

    rig.send(LightCommand::Identify(EffectKind::Stop));

    assert_eq!(rig.output(), Level::new(70));
    assert_eq!(rig.light.active_effect(), None);
    assert_eq!(rig.sink.count(|e| *e == LightEvent::EffectFinished), 1);
}

#[test]
fn level_change_during_effect_updates_attributes_only() {
    let mut rig = Rig::new(LightConfig::default(), lit(50));
    rig.send(LightCommand::Identify(EffectKind::Blink));

    rig.send(LightCommand::SetLevel(Level::new(120)));
    assert_eq!(rig.output(), Level::MAX, "effect keeps the output");
    assert_eq!(rig.light.state(), lit(120));
    assert_eq!(rig.nvs.get("light", "level"), Some(&[120u8][..]));

    rig.advance(500);
    assert_eq!(rig.output(), Level::new(120));
}

// ── Network membership ───────────────────────────────────────

#[test]
fn joining_stops_status_blink() {
    let mut rig = Rig::with_defaults();
    rig.advance(0);
    assert!(rig.led.lit.get(), "blinks while not joined");
    rig.advance(500);
    assert!(!rig.led.lit.get());
    rig.advance(500);
    assert!(rig.led.lit.get());

    rig.send(LightCommand::NetworkJoined);
    assert!(rig.light.is_joined());
    assert!(!rig.led.lit.get());
    let toggles = rig.led.toggles.get();
    rig.advance(5000);
    assert_eq!(rig.led.toggles.get(), toggles);

    rig.send(LightCommand::NetworkLeft);
    rig.advance(0);
    assert!(rig.led.lit.get(), "blinking resumes after leaving");
    assert_eq!(rig.sink.count(|e| *e == LightEvent::NetworkLeft), 1);
}

// ── Configuration ────────────────────────────────────────────

#[test]
fn transition_time_write_is_validated_and_persisted() {
    let mut rig = Rig::with_defaults();

    rig.send(LightCommand::SetOnOffTransition(20));
    assert_eq!(rig.light.config().on_off_transition_ds, 20);
    assert_eq!(
        rig.nvs.saved_config.borrow().as_ref().map(|c| c.on_off_transition_ds),
        Some(20)
    );
    assert_eq!(
        rig.sink.events.last(),
        Some(&LightEvent::ConfigUpdated { persisted: true })
    );

    let events = rig.sink.events.len();
    rig.send(LightCommand::SetOnOffTransition(u16::MAX));
    assert_eq!(rig.light.config().on_off_transition_ds, 20);
    assert_eq!(rig.sink.events.len(), events, "rejected write emits nothing");
}

#[test]
fn startup_policy_applies_even_when_save_fails() {
    let mut rig = Rig::with_defaults();
    rig.nvs.fail_config_save = true;
    let policy = StartupPolicy {
        on_off: OnOffStartup::On,
        level: LevelStartup::Minimum,
    };

    rig.send(LightCommand::SetStartupPolicy(policy));

    assert_eq!(rig.light.startup_policy(), policy);
    assert!(rig.nvs.saved_config.borrow().is_none());
    assert_eq!(
        rig.sink.events.last(),
        Some(&LightEvent::ConfigUpdated { persisted: false })
    );
}

// ── Faults ───────────────────────────────────────────────────

#[test]
fn pwm_failure_keeps_previous_output_and_reports_fault() {
    let mut rig = Rig::with_defaults();
    rig.pwm.fail.set(true);

    rig.send(LightCommand::SetLevel(Level::new(100)));

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.bridge.running.get());
    assert_eq!(
        rig.sink
            .count(|e| *e == LightEvent::OutputFault(ActuatorError::PwmWriteFailed)),
        1
    );
    // The attribute still moved; the next successful write catches up.
    assert_eq!(rig.light.state(), lit(100));
    rig.pwm.fail.set(false);
    rig.send(LightCommand::SetOnOff(true));
    assert_eq!(rig.output(), Level::new(100));
}
