//! JSON values persisted in local or session storage.

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tether_core::{Signal, remember, use_state};
use tether_platform::{KeyValueStore, StorageKind, platform};

/// A value mirrored into a key-value store. Memory and store are only updated together:
/// when a write fails, both keep their previous contents.
pub struct StoredValue<T: 'static> {
    value: Signal<T>,
    initial: Rc<T>,
    key: Rc<str>,
    store: Option<Rc<dyn KeyValueStore>>,
}

impl<T: 'static> Clone for StoredValue<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            initial: self.initial.clone(),
            key: self.key.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: Serialize + Clone + 'static> StoredValue<T> {
    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set(&self, value: T) {
        let encoded = match serde_json::to_string(&value) {
            Ok(s) => s,
            Err(e) => {
                log::error!(
                    "Error setting value in storage for key \"{}\": {e}",
                    self.key
                );
                return;
            }
        };
        if let Some(store) = &self.store
            && let Err(e) = store.set_item(&self.key, &encoded)
        {
            log::error!(
                "Error setting value in storage for key \"{}\": {e}",
                self.key
            );
            return;
        }
        self.value.set(value);
    }

    /// Deletes the entry and falls back to the initial value.
    pub fn remove(&self) {
        if let Some(store) = &self.store
            && let Err(e) = store.remove_item(&self.key)
        {
            log::error!(
                "Error removing value from storage for key \"{}\": {e}",
                self.key
            );
            return;
        }
        self.value.set((*self.initial).clone());
    }
}

fn load<T: DeserializeOwned>(store: Option<&dyn KeyValueStore>, key: &str) -> Option<T> {
    let Some(store) = store else {
        log::warn!("no storage available; \"{key}\" is kept in memory only");
        return None;
    };
    let raw = match store.get_item(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return None,
        Err(e) => {
            log::error!("Error reading storage for key \"{key}\": {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Error parsing stored data for key \"{key}\": {e}");
            None
        }
    }
}

/// Reads `key` from the chosen store on the first pass, falling back to `initial` when
/// absent or unparseable, and returns a handle that writes through.
pub fn use_storage<T>(key: &str, initial: T, kind: StorageKind) -> StoredValue<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    let store = platform().storage(kind);
    let initial = remember(move || initial);
    let value = use_state(|| load(store.as_deref(), key).unwrap_or_else(|| (*initial).clone()));

    StoredValue {
        value,
        initial,
        key: Rc::from(key),
        store,
    }
}
