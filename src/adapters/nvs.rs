//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`].
//!
//! | Namespace | Key      | Contents                          |
//! |-----------|----------|-----------------------------------|
//! | `light`   | `on_off` | 1 byte, persisted on/off          |
//! | `light`   | `level`  | 1 byte, persisted level (0–254)   |
//! | `light`   | `cfg`    | postcard-encoded [`LightConfig`]  |
//!
//! - **`target_os = "espidf"`**: ESP-IDF NVS blobs; every write is
//!   followed by `nvs_commit()`, which is atomic.
//! - **host**: in-memory map keyed `namespace::key`.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::app::settings::NAMESPACE;
use crate::config::LightConfig;
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_KEY: &str = "cfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On a full partition or a version mismatch the partition is erased
    /// and re-initialised, which drops the persisted light state.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK
                {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of an NVS name (max 15 chars).
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let len = name.len().min(15);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Open an NVS namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Stored blob size for `key`, or the ESP error.
    #[cfg(target_os = "espidf")]
    fn blob_size(handle: nvs_handle_t, key: &[u8; 16]) -> Result<usize, i32> {
        let mut size: usize = 0;
        let ret = unsafe {
            nvs_get_blob(
                handle,
                key.as_ptr().cast(),
                core::ptr::null_mut(),
                &mut size,
            )
        };
        if ret != ESP_OK {
            return Err(ret);
        }
        Ok(size)
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<LightConfig, ConfigError> {
        let mut buf = [0u8; 128];
        let len = match self.read(NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                return Ok(LightConfig::default());
            }
            Err(e) => {
                warn!("NvsAdapter: config read error ({}), using defaults", e);
                return Ok(LightConfig::default());
            }
        };
        if len > buf.len() {
            return Err(ConfigError::Corrupted);
        }

        let cfg: LightConfig =
            postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", len);
        Ok(cfg)
    }

    fn save(&self, config: &LightConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.put(NAMESPACE, CONFIG_KEY, &bytes).map_err(|e| {
            warn!("NvsAdapter: config write error ({})", e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl NvsAdapter {
    /// Shared by [`StoragePort::write`] and [`ConfigPort::save`], which
    /// only has `&self`.
    fn put(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::composite_key(namespace, key), data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(handle, key.as_ptr().cast(), data.as_ptr().cast(), data.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let stored = Self::blob_size(handle, &key)?;
                if stored > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }
                // NVS refuses partial reads; fetch the whole blob.
                let mut full = vec![0u8; stored];
                let mut size = stored;
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr().cast(),
                        full.as_mut_ptr().cast(),
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let len = size.min(buf.len());
                buf[..len].copy_from_slice(&full[..len]);
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.put(namespace, key, data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .remove(&Self::composite_key(namespace, key));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key.as_ptr().cast()) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow()
                .contains_key(&Self::composite_key(namespace, key))
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            Self::with_nvs_handle(namespace, false, |handle| Self::blob_size(handle, &key))
                .is_ok()
        }
    }
}
