//! Redis-based cache store.

use super::CacheStore;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use stratum_config::RedisConfig;
use stratum_core::{HealthCheck, HealthStatus, StratumError, StratumResult};
use tracing::{debug, info, warn};

/// Keys requested per `SCAN` round trip.
const SCAN_BATCH: usize = 500;

/// Redis-backed [`CacheStore`].
///
/// Built without a pool it is disabled: every read misses and every write is
/// dropped.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheStore {
    /// Create a new Redis cache store.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Builds a connection pool from configuration.
    ///
    /// An unreachable server is logged, not fatal: the pool reconnects
    /// lazily and reads degrade to misses meanwhile.
    pub async fn connect(config: &RedisConfig) -> StratumResult<Self> {
        info!("Creating Redis connection pool...");

        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| StratumError::Configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StratumError::Cache(format!("Failed to create Redis pool: {}", e)))?;

        match pool.get().await {
            Ok(mut conn) => {
                if let Err(e) = deadpool_redis::redis::cmd("PING")
                    .query_async::<String>(&mut *conn)
                    .await
                {
                    warn!("Redis PING failed: {}", e);
                }
            }
            Err(e) => warn!("Redis is not reachable yet: {}", e),
        }

        info!("Redis connection pool created (size {})", config.pool_size);
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create a no-op cache store (for when caching is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Returns the parts needed to register this store with a shaku module.
    #[must_use]
    pub fn into_parameters(self) -> RedisCacheStoreParameters {
        RedisCacheStoreParameters { pool: self.pool }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StratumResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                StratumError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(StratumError::Cache("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> StratumResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            StratumError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StratumResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        // PSETEX rejects 0; an already-elapsed entry must read as absent.
        let Some(ttl_ms) = expiry_millis(ttl) else {
            self.delete(key).await?;
            return Ok(());
        };

        let mut conn = self.get_conn().await?;
        conn.pset_ex::<_, _, ()>(key, value, ttl_ms).await.map_err(|e| {
            StratumError::Cache(format!("Failed to set key '{}': {}", key, e))
        })?;

        debug!("Cached key '{}' with TTL {}ms", key, ttl_ms);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StratumResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let deleted: u64 = conn.del(key).await.map_err(|e| {
            StratumError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted)
    }

    async fn delete_many(&self, keys: &[String]) -> StratumResult<u64> {
        if !self.is_enabled() || keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let deleted: u64 = conn
            .del(keys)
            .await
            .map_err(|e| StratumError::Cache(format!("Failed to delete keys: {}", e)))?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn scan_keys(&self, pattern: &str) -> StratumResult<Vec<String>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| StratumError::Cache(format!("Failed to scan keys: {}", e)))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();

        debug!("Scanned {} keys matching pattern '{}'", keys.len(), pattern);
        Ok(keys)
    }

    async fn size(&self) -> StratumResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let size: u64 = deadpool_redis::redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(|e| StratumError::Cache(format!("Failed to read store size: {}", e)))?;

        Ok(size)
    }
}

/// Millisecond expiry for `PSETEX`, or `None` when the entry is already
/// expired. Non-zero TTLs under a millisecond round up to one.
fn expiry_millis(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        return None;
    }
    Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Health check adapter for any cache store.
pub struct CacheHealthCheck {
    store: Arc<dyn CacheStore>,
}

impl CacheHealthCheck {
    /// Creates a new cache health check.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HealthCheck for CacheHealthCheck {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        if !self.store.is_enabled() {
            return HealthStatus::Degraded("cache disabled".to_string());
        }

        // The service keeps working without the cache, only slower.
        match self.store.size().await {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}
