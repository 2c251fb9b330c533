//! Fuzz target: persisted config decoding
//!
//! Stores arbitrary bytes under the config key and loads them back:
//! - No panics on any blob
//! - Anything that loads successfully also validates
//! - The on/off and level records fall back instead of failing
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use copper_light::adapters::nvs::NvsAdapter;
use copper_light::app::ports::{ConfigPort, StoragePort};
use copper_light::app::settings;
use copper_light::light::Level;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new() else {
        return;
    };
    if nvs.write(settings::NAMESPACE, "cfg", data).is_err() {
        return;
    }
    if let Ok(config) = nvs.load() {
        assert!(config.validate().is_ok(), "loaded config must validate");
    }

    let _ = nvs.write(settings::NAMESPACE, settings::KEY_ON_OFF, data);
    let _ = nvs.write(settings::NAMESPACE, settings::KEY_LEVEL, data);
    let state = settings::load(&nvs);
    assert!(state.level <= Level::MAX);
});
