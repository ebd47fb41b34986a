//! Durable Storage Module
//!
//! Key/value stores used as the persistent mirror behind the cache.
//! Stores are shared, so every method takes `&self`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

// == Storage Error ==
/// Failure talking to a durable store.
///
/// The cache never surfaces these to its callers; they are logged and the
/// operation falls back to the in-memory tier.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Write would exceed the store's byte quota
    #[error("Storage quota exceeded: needed {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Store is disabled or its state is unusable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Backing file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing data could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Key Value Store Trait ==
/// A string-to-string store that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key in `keys`.
    ///
    /// Stores that rewrite their backing data on each mutation should
    /// override this to do the work in one write.
    fn remove_items(&self, keys: &[String]) -> Result<(), StorageError> {
        keys.iter().try_for_each(|key| self.remove_item(key))
    }

    /// Lists every key currently held by the store.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
