/// Settings persistence over chrome.storage.local, with a localStorage fallback

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::bridge;
use crate::error::StorageError;
use crate::settings::Settings;

/// Reserved key holding the settings object
pub const SETTINGS_KEY: &str = "guard-filter-settings";

/// Async get/set over JSON values, no transactions
#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// chrome.storage.local through the JS bridge
#[derive(Debug, Default)]
pub struct ExtensionStorage;

#[async_trait(?Send)]
impl KeyValueStore for ExtensionStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let stored = bridge::getStorage(key)
            .await
            .map_err(|e| StorageError::Read(format!("{:?}", e)))?;

        if stored.is_null() || stored.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(stored)
            .map(Some)
            .map_err(|e| StorageError::Read(e.to_string()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        // Plain JS objects rather than Maps, so chrome.storage can persist them
        let js_value = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| StorageError::Encode(e.to_string()))?;

        bridge::setStorage(key, js_value)
            .await
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

/// window.localStorage, used when the page runs outside the extension host
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }
}

#[async_trait(?Send)]
impl KeyValueStore for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw = Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(format!("{:?}", e)))?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::Read(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(&value).map_err(|e| StorageError::Encode(e.to_string()))?;

        Self::storage()?
            .set_item(key, &text)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

/// In-process map
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Pick chrome.storage when the extension host is present, localStorage otherwise
pub fn detect_backend() -> Rc<dyn KeyValueStore> {
    if bridge::hasExtensionStorage() {
        info!("Using chrome.storage.local for settings");
        Rc::new(ExtensionStorage)
    } else {
        info!("Extension storage unavailable, falling back to localStorage");
        Rc::new(LocalStorage)
    }
}

/// Owns the persisted settings object
pub struct SettingsStore {
    backend: Rc<dyn KeyValueStore>,
    key: String,
}

impl SettingsStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        SettingsStore {
            backend,
            key: SETTINGS_KEY.to_string(),
        }
    }

    /// Persisted settings, or the defaults when nothing usable is stored.
    /// The defaults are not written back.
    pub async fn load(&self) -> Settings {
        match self.backend.get(&self.key).await {
            Ok(Some(value)) => match serde_json::from_value::<Settings>(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Ignoring unreadable settings: {}", e);
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Settings read failed, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    /// Replace the persisted settings wholesale and hand the value back
    pub async fn save(&self, settings: Settings) -> Result<Settings, StorageError> {
        let value = serde_json::to_value(&settings).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.backend.set(&self.key, value).await?;
        info!("Saved settings (intensity {})", settings.intensity.level());
        Ok(settings)
    }
}
