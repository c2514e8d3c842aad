//! Key/value settings that outlive the process

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub const DURATION_KEY: &str = "duration";
pub const COMMAND_KEY: &str = "command";

/// Settings store shared by the host handlers
pub trait SettingsStore: Send + Sync {
    /// Read a value, falling back to `default` when the key is absent
    fn get(&self, key: &str, default: Value) -> Value;

    fn set(&self, key: &str, value: Value) -> Result<(), String>;
}

/// Settings kept in a single JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(values) => {
                    info!("Loaded {} settings from {}", values.len(), path.display());
                    values
                }
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(e) => {
                debug!("No settings at {} ({}), starting empty", path.display(), e);
                Map::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let text = serde_json::to_string_pretty(values)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&self.path, text)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str, default: Value) -> Value {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or(default)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut values = self.values.lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))?;
        values.insert(key.to_string(), value);
        self.write(&values)?;
        debug!("Persisted setting {} to {}", key, self.path.display());
        Ok(())
    }
}

/// Settings that live only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str, default: Value) -> Value {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or(default)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        self.values.lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))?
            .insert(key.to_string(), value);
        Ok(())
    }
}
