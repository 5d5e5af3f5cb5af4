//! Read-through (cache-aside) loading.

use super::{CacheMetrics, CacheStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stratum_core::StratumResult;
use tracing::{debug, warn};

/// Serves reads from the cache, falling back to a fetcher on a miss and
/// storing what it returns.
///
/// Concurrent misses on the same key each fetch and each write; the last
/// write wins.
#[derive(Clone)]
pub struct CacheAsideLoader {
    store: Arc<dyn CacheStore>,
    metrics: CacheMetrics,
}

impl CacheAsideLoader {
    /// Creates a loader over `store`, recording hits and misses in `metrics`.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, metrics: CacheMetrics) -> Self {
        Self { store, metrics }
    }

    /// Returns the value cached at `key`, or fetches, stores and returns it.
    ///
    /// A fetch failure propagates and nothing is written. An unreachable
    /// store is treated as a miss.
    pub async fn load<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> StratumResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StratumResult<T>> + Send,
    {
        if let Some(cached) = self.lookup(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;
        self.fill(key, &value, ttl).await;
        Ok(value)
    }

    /// Like [`load`](Self::load) for fetchers that may find nothing.
    ///
    /// `None` is returned as-is and never cached, so a later lookup fetches
    /// again.
    pub async fn load_optional<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> StratumResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = StratumResult<Option<T>>> + Send,
    {
        if let Some(cached) = self.lookup(key).await {
            return Ok(Some(cached));
        }

        let value = fetch().await?;
        if let Some(value) = &value {
            self.fill(key, value, ttl).await;
        }
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_raw(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache read failed for key '{}', fetching instead: {}", key, e);
                None
            }
        };

        let Some(json) = raw else {
            self.metrics.record_miss(key);
            return None;
        };

        match serde_json::from_str(&json) {
            Ok(value) => {
                self.metrics.record_hit(key);
                Some(value)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry '{}': {}", key, e);
                self.metrics.record_miss(key);
                None
            }
        }
    }

    async fn fill<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize value for key '{}': {}", key, e);
                return;
            }
        };

        match self.store.set_with_expiry(key, &json, ttl).await {
            Ok(()) => debug!("Filled cache key '{}'", key),
            Err(e) => warn!("Failed to fill cache key '{}': {}", key, e),
        }
    }
}

impl std::fmt::Debug for CacheAsideLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideLoader")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{FailingStore, RecordingStore};
    use crate::cache::{CacheExt, InMemoryCacheStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stratum_core::StratumError;

    const TTL: Duration = Duration::from_secs(60);

    fn loader(store: Arc<dyn CacheStore>) -> (CacheAsideLoader, CacheMetrics) {
        let metrics = CacheMetrics::new();
        (CacheAsideLoader::new(store, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_stores() {
        let store = Arc::new(InMemoryCacheStore::new());
        let (loader, metrics) = loader(store.clone());
        let calls = AtomicUsize::new(0);

        let value: String = loader
            .load("greeting", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("hello".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "hello");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get::<String>("greeting").await.unwrap().as_deref(),
            Some("hello")
        );
        assert_eq!(metrics.misses(), 1);
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let store = Arc::new(InMemoryCacheStore::new());
        store.set("greeting", &"cached", TTL).await.unwrap();
        let (loader, metrics) = loader(store);

        let value: String = loader
            .load("greeting", TTL, || async {
                Err(StratumError::internal("fetch must not run on a hit"))
            })
            .await
            .unwrap();

        assert_eq!(value, "cached");
        assert_eq!(metrics.hits(), 1);
        assert_eq!(metrics.misses(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_stores_nothing() {
        let store = Arc::new(RecordingStore::new());
        let (loader, _) = loader(store.clone());

        let result: StratumResult<String> = loader
            .load("greeting", TTL, || async {
                Err(StratumError::database("connection refused"))
            })
            .await;

        assert!(matches!(result, Err(StratumError::Database(_))));
        assert_eq!(store.sets(), 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_refetched() {
        let store = Arc::new(InMemoryCacheStore::new());
        let (loader, _) = loader(store);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: u32 = loader
                .load("counter", Duration::ZERO, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_falls_through_to_fetch() {
        let (loader, metrics) = loader(Arc::new(FailingStore));

        let value: u32 = loader.load("n", TTL, || async { Ok(42) }).await.unwrap();

        assert_eq!(value, 42);
        assert_eq!(metrics.misses(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_overwritten() {
        let store = Arc::new(InMemoryCacheStore::new());
        store.set_with_expiry("n", "not json", TTL).await.unwrap();
        let (loader, _) = loader(store.clone());

        let value: u32 = loader.load("n", TTL, || async { Ok(5) }).await.unwrap();

        assert_eq!(value, 5);
        assert_eq!(store.get::<u32>("n").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_load_optional_does_not_cache_absence() {
        let store = Arc::new(RecordingStore::new());
        let (loader, _) = loader(store.clone());

        let value: Option<String> = loader
            .load_optional("missing", TTL, || async { Ok(None) })
            .await
            .unwrap();

        assert!(value.is_none());
        assert_eq!(store.sets(), 0);

        let found: Option<String> = loader
            .load_optional("present", TTL, || async { Ok(Some("x".to_string())) })
            .await
            .unwrap();

        assert_eq!(found.as_deref(), Some("x"));
        assert_eq!(store.sets(), 1);
    }
}
