//! `localStorage` as a notebook store.

use nb_core::{KeyValueStore, StoreError};
use wasm_bindgen::JsValue;

pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// The window's `localStorage`, if the browser allows it.
    pub fn from_window() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

fn backend_error(e: JsValue) -> StoreError {
    StoreError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(backend_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(backend_error)
    }
}
