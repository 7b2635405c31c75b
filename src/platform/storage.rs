//! String key-value storage
//!
//! LocalStorage in the browser, an in-memory map everywhere else.

use std::collections::HashMap;

use crate::error::GameError;

/// Minimal string store the persistence layer writes through
pub trait KeyValueStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, GameError>;
    fn set(&mut self, key: &'static str, value: &str) -> Result<(), GameError>;
}

/// Volatile store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, GameError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &'static str, value: &str) -> Result<(), GameError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// None when storage is unavailable (private mode, sandboxed iframe)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, GameError> {
        self.storage.get_item(key).map_err(|e| GameError::Storage {
            key,
            reason: format!("{:?}", e),
        })
    }

    fn set(&mut self, key: &'static str, value: &str) -> Result<(), GameError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| GameError::Storage {
                key,
                reason: format!("{:?}", e),
            })
    }
}
