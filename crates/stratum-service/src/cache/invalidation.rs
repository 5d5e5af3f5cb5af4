//! Key and pattern based invalidation.

use super::{cache_store::is_pattern, CacheStore};
use std::sync::Arc;
use stratum_core::StratumResult;
use tracing::debug;

/// Removes cache entries by key, key list or glob pattern.
///
/// Every operation is idempotent and returns how many entries it removed.
/// Store failures propagate unchanged.
#[derive(Clone)]
pub struct InvalidationController {
    store: Arc<dyn CacheStore>,
}

impl InvalidationController {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Deletes a single entry. Absent keys are a no-op.
    pub async fn invalidate(&self, key: &str) -> StratumResult<u64> {
        let removed = self.store.delete(key).await?;
        debug!("Invalidated '{}' ({} removed)", key, removed);
        Ok(removed)
    }

    /// Deletes a list of entries in one batch.
    ///
    /// Entries containing glob metacharacters are expanded to the keys they
    /// match first. An empty list makes no store call.
    pub async fn invalidate_many(&self, keys: &[String]) -> StratumResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut targets = Vec::with_capacity(keys.len());
        for key in keys {
            if is_pattern(key) {
                targets.extend(self.store.scan_keys(key).await?);
            } else {
                targets.push(key.clone());
            }
        }
        targets.sort();
        targets.dedup();

        if targets.is_empty() {
            return Ok(0);
        }

        let removed = self.store.delete_many(&targets).await?;
        debug!("Invalidated {} keys ({} removed)", targets.len(), removed);
        Ok(removed)
    }

    /// Deletes every entry whose key matches `pattern`.
    pub async fn invalidate_pattern(&self, pattern: &str) -> StratumResult<u64> {
        let keys = self.store.scan_keys(pattern).await?;
        if keys.is_empty() {
            debug!("No keys match '{}'", pattern);
            return Ok(0);
        }

        let removed = self.store.delete_many(&keys).await?;
        debug!("Invalidated pattern '{}' ({} removed)", pattern, removed);
        Ok(removed)
    }
}

impl std::fmt::Debug for InvalidationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationController").finish_non_exhaustive()
    }
}
