//! Tiered Cache Module
//!
//! Main cache engine: an in-memory map with TTL expiry and oldest-first
//! eviction, backed by an optional durable mirror.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, CacheEntry, CacheStats, CreationOrder};
use crate::clock::Clock;
use crate::error::Result;
use crate::storage::KeyValueStore;

// == Tiered Cache ==
/// Memoizes values with a TTL, bounded capacity and cross-restart reuse.
///
/// Reads consult memory first, then the durable mirror. A live durable hit
/// is promoted back into memory. Durable failures are logged and never
/// change the outcome of an operation.
pub struct TieredCache<V> {
    /// In-memory tier
    entries: HashMap<String, CacheEntry<V>>,
    /// Eviction order by creation time
    order: CreationOrder,
    /// Hit, miss and eviction counters
    stats: CacheStats,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    /// Durable tier, present only when mirroring is enabled
    durable: Option<Arc<dyn KeyValueStore>>,
}

impl<V> fmt::Debug for TieredCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .field("mirrored", &self.durable.is_some())
            .finish_non_exhaustive()
    }
}

impl<V> TieredCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates a cache from validated settings.
    ///
    /// `durable` is ignored unless `config.use_durable_mirror` is set.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::error::Error::InvalidConfig)
    /// for a zero capacity or zero default TTL.
    pub fn new(
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        durable: Option<Arc<dyn KeyValueStore>>,
    ) -> Result<Self> {
        config.validate()?;

        let durable = if config.use_durable_mirror {
            durable
        } else {
            None
        };

        Ok(Self {
            entries: HashMap::new(),
            order: CreationOrder::new(),
            stats: CacheStats::new(config.max_entries),
            config,
            clock,
            durable,
        })
    }

    // == Set ==
    /// Stores a value with the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.config.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value that expires after `ttl`.
    ///
    /// Overwriting a key re-creates its entry. If the insert pushes the
    /// cache over capacity, exactly one entry (the oldest) is evicted.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);

        self.write_durable(&key, &entry);
        self.insert_memory(key, entry);
    }

    // == Get ==
    /// Returns the live value for `key`, or `None` if absent or expired.
    ///
    /// An expired entry found in either tier is removed from both.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired_at(now) {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            debug!("Cache entry '{}' expired", key);
            self.delete(key);
            self.stats.record_miss();
            return None;
        }

        match self.read_durable(key) {
            Some(entry) if entry.is_expired_at(now) => {
                debug!("Durable entry '{}' expired", key);
                self.remove_durable(key);
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                debug!("Promoting durable entry '{}' into memory", key);
                let value = entry.value.clone();
                self.insert_memory(key.to_string(), entry);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Returns true if `get` would return a value.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Get Or Insert ==
    /// Returns the cached value, or runs `fetch` and caches its result.
    ///
    /// Failed fetches are returned unchanged and nothing is cached.
    pub fn get_or_insert_with<F, E>(&mut self, key: &str, fetch: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = fetch()?;
        self.set(key, value.clone());
        Ok(value)
    }

    // == Delete ==
    /// Removes `key` from both tiers. Deleting a missing key is a no-op.
    pub fn delete(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.remove_durable(key);
    }

    // == Clear ==
    /// Removes every in-memory entry and every durable key under this
    /// cache's namespace. Other durable keys are left alone.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();

        let Some(store) = &self.durable else {
            return;
        };

        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list durable keys for clear: {}", e);
                return;
            }
        };

        let owned: Vec<String> = keys
            .into_iter()
            .filter(|k| k.starts_with(self.config.namespace.as_str()))
            .collect();
        if let Err(e) = store.remove_items(&owned) {
            warn!("Failed to clear {} durable keys: {}", owned.len(), e);
        }
    }

    // == Purge Expired ==
    /// Removes expired entries from memory and from the durable namespace.
    ///
    /// Reads never return expired values whether or not this runs.
    /// Returns the number of in-memory entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.order.remove(key);
        }

        // Durable copies share the expiry, so one batched pass removes them
        self.purge_durable(now);
        expired.len()
    }

    // == Stats ==
    /// Returns current size, capacity, live keys and counters.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();

        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();

        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.keys = keys;
        stats
    }

    // == Length ==
    /// Returns the current number of in-memory entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Memory Tier ==
    fn insert_memory(&mut self, key: String, entry: CacheEntry<V>) {
        self.order.insert(&key, entry.created_at);
        self.entries.insert(key.clone(), entry);

        if self.entries.len() > self.config.max_entries {
            self.evict_one(&key);
        }
    }

    fn evict_one(&mut self, keep: &str) {
        if let Some(victim) = self.order.evict_oldest_except(keep) {
            debug!("Evicting oldest cache entry '{}'", victim);
            self.entries.remove(&victim);
            self.remove_durable(&victim);
            self.stats.record_eviction();
        }
    }

    // == Durable Tier ==
    fn durable_key(&self, key: &str) -> String {
        format!("{}{}", self.config.namespace, key)
    }

    fn write_durable(&self, key: &str, entry: &CacheEntry<V>) {
        let Some(store) = &self.durable else {
            return;
        };

        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize cache entry '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = store.set_item(&self.durable_key(key), &json) {
            warn!("Failed to mirror cache entry '{}': {}", key, e);
        }
    }

    fn read_durable(&self, key: &str) -> Option<CacheEntry<V>> {
        let store = self.durable.as_ref()?;

        let raw = match store.get_item(&self.durable_key(key)) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read durable entry '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring malformed durable entry '{}': {}", key, e);
                None
            }
        }
    }

    fn remove_durable(&self, key: &str) {
        let Some(store) = &self.durable else {
            return;
        };

        if let Err(e) = store.remove_item(&self.durable_key(key)) {
            warn!("Failed to remove durable entry '{}': {}", key, e);
        }
    }

    fn purge_durable(&self, now: u64) {
        let Some(store) = &self.durable else {
            return;
        };

        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list durable keys for purge: {}", e);
                return;
            }
        };

        let expired: Vec<String> = keys
            .into_iter()
            .filter(|k| k.starts_with(self.config.namespace.as_str()))
            .filter(|k| {
                matches!(
                    store.get_item(k),
                    Ok(Some(raw)) if serde_json::from_str::<CacheEntry<V>>(&raw)
                        .map(|entry| entry.is_expired_at(now))
                        .unwrap_or(false)
                )
            })
            .collect();

        if let Err(e) = store.remove_items(&expired) {
            warn!("Failed to purge {} durable keys: {}", expired.len(), e);
        }
    }
}
