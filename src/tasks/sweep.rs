//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads already skip expired entries, so this only reclaims memory and
//! durable space.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCache;

/// Spawns a background task that purges expired entries every `interval`.
///
/// Returns a JoinHandle that should be aborted during shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(state.cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: Arc<RwLock<TieredCache<V>>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.purge_expired()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
