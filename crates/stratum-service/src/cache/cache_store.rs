//! Cache store trait over an external expiring key-value store.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shaku::Interface;
use std::time::Duration;
use stratum_core::StratumResult;

/// Capability interface over the key-value store holding cache entries.
///
/// Values are JSON strings so the trait stays dyn-compatible; [`CacheExt`]
/// layers typed access on top. Expiry is enforced by the store: once an
/// entry's TTL elapses, reads behave as if it was never written.
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Reads the raw JSON stored at `key`.
    async fn get_raw(&self, key: &str) -> StratumResult<Option<String>>;

    /// Writes `value` at `key`, replacing any previous entry, expiring after `ttl`.
    ///
    /// A zero TTL leaves the key absent.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StratumResult<()>;

    /// Deletes `key`. Returns the number of entries removed (0 or 1).
    async fn delete(&self, key: &str) -> StratumResult<u64>;

    /// Deletes every key in `keys` in one batch.
    async fn delete_many(&self, keys: &[String]) -> StratumResult<u64>;

    /// Lists live keys matching a glob pattern (`*`, `?`, `[...]`), sorted.
    async fn scan_keys(&self, pattern: &str) -> StratumResult<Vec<String>>;

    /// Number of live entries in the store.
    async fn size(&self) -> StratumResult<u64>;

    /// Whether the store keeps anything at all.
    fn is_enabled(&self) -> bool;
}

/// Typed helpers over [`CacheStore`].
#[async_trait]
pub trait CacheExt: CacheStore {
    /// Reads and deserializes the value at `key`.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> StratumResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serializes and writes `value` at `key`.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> StratumResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_with_expiry(key, &json, ttl).await
    }
}

impl<T: CacheStore + ?Sized> CacheExt for T {}

/// Returns true if `key` contains glob metacharacters.
#[must_use]
pub fn is_pattern(key: &str) -> bool {
    key.contains(['*', '?', '['])
}
