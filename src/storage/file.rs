//! JSON file key/value store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// Store persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every mutation. Writes go to a sibling
/// temporary file first and are renamed into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// logged and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Ignoring corrupt store file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store file {} not found, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }

    fn persist(&self, items: &HashMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string(items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.lock()?;
        let previous = items.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&items) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.lock()?;
        let Some(old) = items.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&items) {
            items.insert(key.to_string(), old);
            return Err(e);
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut items = self.lock()?;
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| items.remove_entry(key.as_str()))
            .collect();
        if removed.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.persist(&items) {
            items.extend(removed);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();

        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set_item("a", "1").unwrap();
            store.set_item("b", "2").unwrap();
            store.remove_item("b").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(reopened.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());

        store.set_item("a", "1").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_file_store_write_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so every write fails
        let store = FileStore::open(dir.path().join("missing").join("store.json")).unwrap();

        assert!(matches!(store.set_item("a", "1"), Err(StorageError::Io(_))));
        assert_eq!(store.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_failure_keeps_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();

        // Occupy the temp file path with a directory so the next write fails
        fs::create_dir(path.with_extension("tmp")).unwrap();

        assert!(store.remove_item("a").is_err());
        assert_eq!(store.get_item("a").unwrap(), Some("1".to_string()));

        assert!(store.remove_items(&["a".to_string(), "b".to_string()]).is_err());
        assert_eq!(store.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get_item("b").unwrap(), Some("2".to_string()));

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_file_store_remove_items_in_one_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        for key in ["a", "b", "c"] {
            store.set_item(key, "v").unwrap();
        }

        store
            .remove_items(&["a".to_string(), "c".to_string(), "missing".to_string()])
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["b".to_string()]);
    }
}
