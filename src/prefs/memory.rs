//! In-memory preference store

use super::{PrefStore, PrefsError};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Non-durable store for tests and ephemeral embeddings
#[derive(Default)]
pub struct MemoryPrefStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let store = MemoryPrefStore::new();
        assert_eq!(store.get("duration"), None);

        store.set("duration", "15").unwrap();
        assert_eq!(store.get("duration"), Some("15".to_string()));

        store.set("duration", "30").unwrap();
        assert_eq!(store.get("duration"), Some("30".to_string()));
    }
}
