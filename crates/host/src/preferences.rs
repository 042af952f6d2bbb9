//! Read-only access to the host's preference storage.
//!
//! The core never writes preferences and never subscribes to them; the host
//! reads initial values through [`PreferenceStore`] and pushes later changes
//! in explicitly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

pub type PreferenceStoreRef = Arc<dyn PreferenceStore>;

/// Map-backed preference store.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<String, bool>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.values.write().unwrap().insert(key.to_string(), value);
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values
            .read()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_uses_default() {
        let store = InMemoryPreferenceStore::with_values([("pick_up", false)]);
        assert!(!store.get_bool("pick_up", true));
        assert!(store.get_bool("gesture_ir", true));
        assert!(!store.get_bool("gesture_attentive_display", false));

        store.set_bool("gesture_attentive_display", true);
        assert!(store.get_bool("gesture_attentive_display", false));
    }
}
