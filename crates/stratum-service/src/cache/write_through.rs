//! Write-through: persist first, then refresh the cache.

use super::{CacheExt, CacheStore};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stratum_core::StratumResult;
use tracing::{debug, warn};

/// Persists a value synchronously and then overwrites its cache entry.
#[derive(Clone)]
pub struct WriteThroughWriter {
    store: Arc<dyn CacheStore>,
}

impl WriteThroughWriter {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Runs `persist`, then caches its result at `key`.
    ///
    /// A persist failure propagates and leaves the cache untouched. A cache
    /// failure after a successful persist is only logged.
    pub async fn write<T, F, Fut>(&self, key: &str, ttl: Duration, persist: F) -> StratumResult<T>
    where
        T: Serialize + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StratumResult<T>> + Send,
    {
        let value = persist().await?;

        match self.store.set(key, &value, ttl).await {
            Ok(()) => debug!("Wrote through cache key '{}'", key),
            Err(e) => warn!("Persisted but failed to cache key '{}': {}", key, e),
        }

        Ok(value)
    }
}

impl std::fmt::Debug for WriteThroughWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteThroughWriter").finish_non_exhaustive()
    }
}
