//! Persisted light attributes: `light/on_off` and `light/level`.
//!
//! Each record is a single byte. A missing record is normal on first boot;
//! a record of any other length is rejected and the field keeps its
//! compiled-in default.

use log::{debug, info, warn};

use crate::light::Level;
use crate::light::startup::LightState;

use super::ports::{StorageError, StoragePort};

pub const NAMESPACE: &str = "light";
pub const KEY_ON_OFF: &str = "on_off";
pub const KEY_LEVEL: &str = "level";

/// Load both records, falling back per field.
pub fn load(store: &impl StoragePort) -> LightState {
    let defaults = LightState::default();
    let on = read_byte(store, KEY_ON_OFF).map_or(defaults.on, |b| b != 0);
    let level = read_byte(store, KEY_LEVEL).map_or(defaults.level, Level::new);
    info!("settings: loaded on={} level={}", on, level);
    LightState { on, level }
}

/// Write both records.
pub fn save(store: &mut impl StoragePort, state: LightState) -> Result<(), StorageError> {
    store.write(NAMESPACE, KEY_ON_OFF, &[u8::from(state.on)])?;
    store.write(NAMESPACE, KEY_LEVEL, &[state.level.get()])?;
    debug!("settings: saved on={} level={}", state.on, state.level);
    Ok(())
}

fn read_byte(store: &impl StoragePort, key: &str) -> Option<u8> {
    let mut buf = [0u8; 1];
    match store.read(NAMESPACE, key, &mut buf) {
        Ok(1) => Some(buf[0]),
        Ok(len) => {
            warn!("settings: {}/{} has length {}, expected 1; ignoring", NAMESPACE, key, len);
            None
        }
        Err(StorageError::NotFound) => None,
        Err(e) => {
            warn!("settings: {}/{} read failed: {}", NAMESPACE, key, e);
            None
        }
    }
}
