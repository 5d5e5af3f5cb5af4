//! Process-local cache store for development and tests.

use super::CacheStore;
use async_trait::async_trait;
use regex::Regex;
use shaku::Component;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use stratum_core::{StratumError, StratumResult};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    // None when the TTL is too large to represent.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// In-memory [`CacheStore`] with the same expiry and glob semantics as Redis.
///
/// Expired entries are treated as absent on read and swept on write.
#[derive(Component, Default)]
#[shaku(interface = CacheStore)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Translates a Redis-style glob into an anchored regex.
///
/// Supports `*`, `?`, `[abc]`, `[^abc]` / `[!abc]`, `[a-z]` and `\` escapes.
fn glob_to_regex(pattern: &str) -> StratumResult<Regex> {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    regex.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            '[' => {
                regex.push('[');
                if matches!(chars.peek(), Some('^' | '!')) {
                    chars.next();
                    regex.push('^');
                }
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '-' => regex.push('-'),
                        other => regex.push_str(&regex::escape(&other.to_string())),
                    }
                }
                if !closed {
                    return Err(StratumError::validation(format!(
                        "Unterminated character class in pattern '{}'",
                        pattern
                    )));
                }
                regex.push(']');
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }

    regex.push('$');
    Regex::new(&regex)
        .map_err(|e| StratumError::validation(format!("Invalid pattern '{}': {}", pattern, e)))
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> StratumResult<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let value = entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StratumResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now.checked_add(ttl),
            },
        );

        debug!("Cached key '{}' with TTL {}ms", key, ttl.as_millis());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StratumResult<u64> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);

        let deleted = u64::from(removed.is_some_and(|entry| entry.is_live(now)));
        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted)
    }

    async fn delete_many(&self, keys: &[String]) -> StratumResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let deleted = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| entry.is_live(now))
            .count() as u64;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn scan_keys(&self, pattern: &str) -> StratumResult<Vec<String>> {
        let matcher = glob_to_regex(pattern)?;
        let now = Instant::now();

        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && matcher.is_match(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();

        Ok(keys)
    }

    async fn size(&self) -> StratumResult<u64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries.values().filter(|entry| entry.is_live(now)).count() as u64)
    }
}

impl std::fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheStore").finish_non_exhaustive()
    }
}
