//! Persistence gateway: the notebook lives in one string-keyed slot.
//!
//! Backends implement [`KeyValueStore`] (browser `localStorage`, a file per
//! key on desktop, a map in tests). Loading never fails: a missing slot or
//! an unparsable payload yields the starter document.

use crate::error::StoreError;
use crate::migrate::migrate;
use crate::model::NotebookState;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Slot the notebook is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "notebook-state-v1";

/// A get/set pair against string-keyed slots.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one slot pre-filled.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory (`<dir>/<key>.json`).
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a half-written slot.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Decode a persisted payload into a valid state.
///
/// `None`, an unparsable payload or a payload that is not a JSON object
/// yields [`NotebookState::starter`]; any object is migrated and its cursor
/// repaired.
pub fn decode_state(raw: Option<&str>) -> NotebookState {
    let Some(raw) = raw else {
        log::debug!("no persisted notebook; using starter document");
        return NotebookState::starter();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if !value.is_object() => {
            log::warn!("persisted notebook is not an object; using starter document");
            NotebookState::starter()
        }
        Ok(value) => {
            let mut state = migrate(&value);
            state.repair();
            state
        }
        Err(e) => {
            log::warn!("failed to parse notebook state: {e}");
            NotebookState::starter()
        }
    }
}

/// Load the notebook from `key`. Backend failures count as "no prior state".
pub fn load_state(store: &dyn KeyValueStore, key: &str) -> NotebookState {
    match store.get(key) {
        Ok(raw) => decode_state(raw.as_deref()),
        Err(e) => {
            log::warn!("failed to read notebook slot {key:?}: {e}");
            NotebookState::starter()
        }
    }
}

/// Serialize the whole notebook into `key`.
pub fn save_state(
    store: &mut dyn KeyValueStore,
    key: &str,
    state: &NotebookState,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(state)?;
    store.set(key, &json)?;
    log::trace!("saved notebook ({} bytes) to {key:?}", json.len());
    Ok(())
}
