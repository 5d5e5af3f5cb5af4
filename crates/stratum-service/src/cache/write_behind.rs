//! Write-behind: update the cache now, persist later.

use super::{CacheExt, CacheMetrics, CacheStore};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stratum_core::StratumResult;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Writes a value to the cache immediately and persists it on a detached
/// task.
///
/// The caller learns nothing about the persist: its failures are logged and
/// counted, never returned. Until it completes the cache is ahead of the
/// backing store, and if it fails the two stay apart until the entry expires
/// or is rewritten. Failed persists are not retried.
#[derive(Clone)]
pub struct WriteBehindWriter {
    store: Arc<dyn CacheStore>,
    metrics: CacheMetrics,
}

impl WriteBehindWriter {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, metrics: CacheMetrics) -> Self {
        Self { store, metrics }
    }

    /// Caches `value` at `key`, then spawns `persist` without awaiting it.
    ///
    /// Returns once the cache write has finished (or failed, which is only
    /// logged). The returned handle may be dropped; the task keeps running.
    pub async fn write<T, R, F, Fut>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        persist: F,
    ) -> JoinHandle<()>
    where
        T: Serialize + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = StratumResult<R>> + Send + 'static,
        R: Send + 'static,
    {
        match self.store.set(key, value, ttl).await {
            Ok(()) => debug!("Wrote behind cache key '{}'", key),
            Err(e) => warn!("Failed to cache key '{}' ahead of persist: {}", key, e),
        }

        let key = key.to_string();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            match persist().await {
                Ok(_) => debug!("Deferred persist for key '{}' completed", key),
                Err(e) => {
                    error!("Deferred persist for key '{}' failed: {}", key, e);
                    metrics.record_write_behind_failure(&key);
                }
            }
        })
    }
}

impl std::fmt::Debug for WriteBehindWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBehindWriter")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
