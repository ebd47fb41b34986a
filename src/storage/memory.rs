//! In-memory key/value store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{KeyValueStore, StorageError};

/// Process-local store, optionally bounded by a byte quota.
///
/// The quota counts key and value bytes, the way browser storage does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Creates a store whose every operation fails.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Number of stored items. A disabled or poisoned store reports 0.
    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

fn used_bytes(items: &HashMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            let available = quota.saturating_sub(used_bytes(&items) - replaced);
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StorageError::QuotaExceeded { needed, available });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
