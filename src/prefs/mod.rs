//! Durable preference store
//!
//! Two values survive app restarts: whether the usage guide has been seen
//! and the chosen recording duration. Both go through a small string
//! key-value seam rather than a concrete storage mechanism.

pub mod file;
pub mod memory;

pub use file::FilePrefStore;
pub use memory::MemoryPrefStore;

use thiserror::Error;

/// Key for the seen-the-guide sentinel
pub const GUIDE_SEEN_KEY: &str = "guide-seen";

/// Key for the recording duration in seconds
pub const DURATION_KEY: &str = "duration";

/// Preference persistence errors
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed scalar storage
pub trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}
