//! Level save/load
//!
//! Features:
//! - Versioned JSON level document
//! - Three named save slots
//! - In-memory store (native, tests) and LocalStorage store (web)
//! - Corrupted slots are reported, not silently replaced

pub mod level;

pub use level::{GoalRegion, LEVEL_VERSION, Level};

use std::collections::HashMap;
use std::fmt;

/// Named save slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    One,
    Two,
    Three,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::One, Slot::Two, Slot::Three];

    /// Storage key for this slot
    pub fn key(&self) -> &'static str {
        match self {
            Slot::One => "slot1",
            Slot::Two => "slot2",
            Slot::Three => "slot3",
        }
    }

    /// Parse a slot number ("1", "2" or "3")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Slot::One),
            "2" => Some(Slot::Two),
            "3" => Some(Slot::Three),
            _ => None,
        }
    }
}

/// Why a save or load failed
#[derive(Debug)]
pub enum LevelError {
    /// The level could not be encoded or the stored text is not a level
    Json(serde_json::Error),
    /// The backing storage refused the operation
    Storage(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Json(e) => write!(f, "invalid level data: {}", e),
            LevelError::Storage(msg) => write!(f, "level storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Json(e) => Some(e),
            LevelError::Storage(_) => None,
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Json(e)
    }
}

/// Somewhere levels can be kept between sessions
pub trait LevelStore {
    /// Store raw level text under `key`
    fn write(&mut self, key: &str, json: String) -> Result<(), LevelError>;

    /// Raw level text under `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>, LevelError>;

    fn save(&mut self, slot: Slot, level: &Level) -> Result<(), LevelError> {
        let json = level.to_json()?;
        self.write(slot.key(), json)?;
        log::info!(
            "Saved level to {} ({} ramps, {} gadgets)",
            slot.key(),
            level.parts.len(),
            level.static_objects.len()
        );
        Ok(())
    }

    /// `Ok(None)` for an empty slot
    fn load(&self, slot: Slot) -> Result<Option<Level>, LevelError> {
        let Some(json) = self.read(slot.key())? else {
            log::info!("No level in {}", slot.key());
            return Ok(None);
        };
        match Level::from_json(&json) {
            Ok(level) => {
                log::info!("Loaded level from {}", slot.key());
                Ok(Some(level))
            }
            Err(e) => {
                log::warn!("Level in {} is corrupted: {}", slot.key(), e);
                Err(e.into())
            }
        }
    }
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevelStore for MemoryStore {
    fn write(&mut self, key: &str, json: String) -> Result<(), LevelError> {
        self.entries.insert(key.to_string(), json);
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, LevelError> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// `None` when the page has no LocalStorage (e.g. disabled by the user)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl LevelStore for LocalStorageStore {
    fn write(&mut self, key: &str, json: String) -> Result<(), LevelError> {
        self.storage
            .set_item(key, &json)
            .map_err(|e| LevelError::Storage(format!("{:?}", e)))
    }

    fn read(&self, key: &str) -> Result<Option<String>, LevelError> {
        self.storage
            .get_item(key)
            .map_err(|e| LevelError::Storage(format!("{:?}", e)))
    }
}
