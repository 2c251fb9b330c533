//! Button edges → debounce → toggle fade / factory reset.

use copper_light::app::commands::LightCommand;
use copper_light::app::events::{ChangeSource, LightEvent};
use copper_light::config::LightConfig;
use copper_light::light::Level;
use copper_light::light::effect::EffectKind;
use copper_light::light::startup::LightState;

use crate::mock_hw::Rig;

fn button_toggles(rig: &Rig) -> usize {
    rig.sink.count(|e| {
        matches!(
            e,
            LightEvent::StateChanged {
                source: ChangeSource::Button,
                ..
            }
        )
    })
}

#[test]
fn short_press_fades_on_to_full() {
    let mut rig = Rig::with_defaults();

    rig.press(200, 2000);

    assert_eq!(rig.output(), Level::MAX);
    assert!(!rig.light.is_fading());
    assert!(rig.bridge.running.get());
    assert_eq!(rig.net.published, vec![(true, Level::MAX)]);
    assert_eq!(rig.nvs.get("light", "on_off"), Some(&[1u8][..]));
    assert_eq!(rig.nvs.get("light", "level"), Some(&[254u8][..]));
    assert_eq!(button_toggles(&rig), 1);
}

#[test]
fn fade_climbs_monotonically_in_steps() {
    let mut rig = Rig::with_defaults();

    rig.press(200, 500);
    assert!(rig.light.is_fading());
    let mid = rig.output();
    assert!(mid > Level::OFF && mid < Level::MAX, "mid-fade level {:?}", mid);

    rig.advance(2000);
    let writes = rig.pwm.writes.borrow();
    // One startup write of zero plus 50 steps of 20 ms over the default second.
    assert_eq!(writes.len(), 51);
    assert!(writes.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn second_press_fades_off_and_keeps_level() {
    let mut rig = Rig::with_defaults();
    rig.press(200, 2000);

    rig.press(200, 2000);

    assert_eq!(rig.output(), Level::OFF);
    assert!(!rig.bridge.running.get());
    assert_eq!(rig.light.state().level, Level::MAX);
    assert_eq!(rig.nvs.get("light", "on_off"), Some(&[0u8][..]));
    assert_eq!(
        rig.net.published,
        vec![(true, Level::MAX), (false, Level::MAX)]
    );
}

#[test]
fn toggle_on_returns_to_last_visible_level() {
    let mut rig = Rig::with_defaults();
    rig.send(LightCommand::SetLevel(Level::new(90)));
    rig.send(LightCommand::SetOnOff(false));

    rig.press(150, 2000);

    assert_eq!(rig.output(), Level::new(90));
    assert_eq!(rig.net.published, vec![(true, Level::new(90))]);
}

#[test]
fn zero_transition_time_uses_default_fade() {
    let mut config = LightConfig::default();
    config.on_off_transition_ds = 0;
    let mut rig = Rig::new(config, LightState::default());

    rig.press(200, 500);
    assert!(rig.light.is_fading());

    rig.advance(1000);
    assert_eq!(rig.output(), Level::MAX);
}

#[test]
fn long_press_factory_resets_without_toggling() {
    let mut rig = Rig::with_defaults();
    rig.send(LightCommand::NetworkJoined);
    rig.net.joined = true;
    let toggles_before = rig.led.toggles.get();

    rig.set_button(true);
    rig.advance(3100);

    assert_eq!(rig.net.leaves, 1);
    assert_eq!(
        rig.sink.count(|e| *e == LightEvent::FactoryReset { left_network: true }),
        1
    );

    rig.set_button(false);
    rig.advance(1000);

    assert_eq!(button_toggles(&rig), 0);
    assert_eq!(rig.output(), Level::OFF);
    assert!(rig.net.published.is_empty());
    assert_eq!(rig.led.toggles.get() - toggles_before, 6);
    assert!(!rig.led.lit.get());
}

#[test]
fn long_press_while_unjoined_does_not_leave() {
    let mut rig = Rig::with_defaults();

    rig.set_button(true);
    rig.advance(3100);
    rig.set_button(false);
    rig.advance(1000);

    assert_eq!(rig.net.leaves, 0);
    assert_eq!(
        rig.sink.count(|e| *e == LightEvent::FactoryReset { left_network: false }),
        1
    );
}

#[test]
fn contact_bounce_collapses_into_one_press() {
    let mut rig = Rig::with_defaults();

    rig.set_button(true);
    rig.advance(3);
    rig.set_button(false);
    rig.advance(3);
    rig.set_button(true);
    rig.advance(300);
    rig.set_button(false);
    rig.advance(4);
    rig.set_button(true);
    rig.advance(4);
    rig.set_button(false);
    rig.advance(2000);

    assert_eq!(button_toggles(&rig), 1);
    assert_eq!(rig.output(), Level::MAX);
}

#[test]
fn press_during_effect_defers_output_until_restore() {
    let mut rig = Rig::with_defaults();
    rig.send(LightCommand::Identify(EffectKind::Blink));

    rig.press(100, 100);
    assert!(rig.light.state().on);
    assert!(!rig.light.is_fading());

    rig.advance(1000);
    assert_eq!(rig.light.active_effect(), None);
    assert_eq!(rig.output(), Level::MAX);
}
