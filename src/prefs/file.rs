//! JSON-file-backed preference store
//!
//! A single flat JSON object on disk, read once on open and written through
//! on every set. A missing file is an empty store, not an error.

use super::{PrefStore, PrefsError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable store persisting to one JSON file
pub struct FilePrefStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FilePrefStore {
    /// Open the store at `path`, loading any existing values
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PrefStore for FilePrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{DURATION_KEY, GUIDE_SEEN_KEY};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = FilePrefStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get(GUIDE_SEEN_KEY), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        {
            let store = FilePrefStore::open(&path).unwrap();
            store.set(DURATION_KEY, "20").unwrap();
            store.set(GUIDE_SEEN_KEY, "true").unwrap();
        }

        let reopened = FilePrefStore::open(&path).unwrap();
        assert_eq!(reopened.get(DURATION_KEY), Some("20".to_string()));
        assert_eq!(reopened.get(GUIDE_SEEN_KEY), Some("true".to_string()));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config/prefs.json");

        let store = FilePrefStore::open(&path).unwrap();
        store.set(DURATION_KEY, "5").unwrap();
        assert!(path.exists());
    }
}
