//! Progress that survives between sessions
//!
//! Two keys, no versioning:
//! - `techUpgrades`: JSON object of booleans
//! - `plasmaCount`: decimal integer
//!
//! Missing or corrupt values fall back to defaults and are logged; loading
//! never fails.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::platform::storage::KeyValueStore;
use crate::sim::progression::TechFlags;

pub const TECH_KEY: &str = "techUpgrades";
pub const PLASMA_KEY: &str = "plasmaCount";

/// Persisted tech unlocks and plasma currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub tech: TechFlags,
    pub plasma: u32,
}

impl Progress {
    /// Load from the store, recovering from anything unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let tech = read_or_default(store, TECH_KEY, |raw| {
            serde_json::from_str::<TechFlags>(raw).map_err(|e| e.to_string())
        });
        let plasma = read_or_default(store, PLASMA_KEY, |raw| {
            raw.trim().parse::<u32>().map_err(|e| e.to_string())
        });
        let progress = Self { tech, plasma };
        log::info!("Loaded progress: {} plasma, {:?}", plasma, tech);
        progress
    }

    /// Write both keys
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), GameError> {
        let tech = serde_json::to_string(&self.tech).map_err(|e| GameError::Storage {
            key: TECH_KEY,
            reason: e.to_string(),
        })?;
        store.set(TECH_KEY, &tech)?;
        store.set(PLASMA_KEY, &self.plasma.to_string())?;
        log::debug!("Saved progress ({} plasma)", self.plasma);
        Ok(())
    }
}

fn read_or_default<T: Default>(
    store: &dyn KeyValueStore,
    key: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("{}; using default", e);
            return T::default();
        }
    };
    parse(&raw).unwrap_or_else(|reason| {
        let err = GameError::CorruptValue { key, reason };
        log::warn!("{}; using default", err);
        T::default()
    })
}
