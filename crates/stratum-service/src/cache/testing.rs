//! Test doubles for [`CacheStore`].

use super::{CacheStore, InMemoryCacheStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stratum_core::{StratumError, StratumResult};

/// A store whose every operation fails as if Redis were down.
pub struct FailingStore;

fn unavailable() -> StratumError {
    StratumError::cache("Failed to get Redis connection: connection refused")
}

#[async_trait]
impl CacheStore for FailingStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, _key: &str) -> StratumResult<Option<String>> {
        Err(unavailable())
    }

    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl: Duration) -> StratumResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> StratumResult<u64> {
        Err(unavailable())
    }

    async fn delete_many(&self, _keys: &[String]) -> StratumResult<u64> {
        Err(unavailable())
    }

    async fn scan_keys(&self, _pattern: &str) -> StratumResult<Vec<String>> {
        Err(unavailable())
    }

    async fn size(&self) -> StratumResult<u64> {
        Err(unavailable())
    }
}

/// An in-memory store that counts the calls made to it.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryCacheStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
    batch_deletes: AtomicUsize,
    scans: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn batch_deletes(&self) -> usize {
        self.batch_deletes.load(Ordering::SeqCst)
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Total store calls of any kind.
    pub fn calls(&self) -> usize {
        self.gets()
            + self.sets()
            + self.deletes.load(Ordering::SeqCst)
            + self.batch_deletes()
            + self.scans()
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> StratumResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_raw(key).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StratumResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set_with_expiry(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> StratumResult<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> StratumResult<u64> {
        self.batch_deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_many(keys).await
    }

    async fn scan_keys(&self, pattern: &str) -> StratumResult<Vec<String>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_keys(pattern).await
    }

    async fn size(&self) -> StratumResult<u64> {
        self.inner.size().await
    }
}
