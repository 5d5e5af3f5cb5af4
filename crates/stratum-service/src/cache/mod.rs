//! Caching infrastructure for the service layer.
//!
//! [`CacheStore`] abstracts the external expiring key-value store, with a
//! Redis implementation and an in-memory one. The helpers compose a store
//! with caller-supplied closures:
//!
//! | helper                     | ordering                                   |
//! |----------------------------|--------------------------------------------|
//! | [`CacheAsideLoader`]       | cache, then fetch + fill on a miss          |
//! | [`WriteThroughWriter`]     | persist, then cache                        |
//! | [`WriteBehindWriter`]      | cache, then persist on a detached task     |
//! | [`InvalidationController`] | delete by key, key list or glob pattern    |

mod cache_aside;
pub mod cache_keys;
pub mod cache_metrics;
mod cache_policy;
mod cache_store;
mod invalidation;
mod memory_cache;
mod redis_cache;
mod write_behind;
mod write_through;

#[cfg(test)]
pub(crate) mod testing;

pub use cache_aside::CacheAsideLoader;
pub use cache_metrics::{register_metrics, CacheMetrics};
pub use cache_policy::CachePolicy;
pub use cache_store::{is_pattern, CacheExt, CacheStore};
pub use invalidation::InvalidationController;
pub use memory_cache::{InMemoryCacheStore, InMemoryCacheStoreParameters};
pub use redis_cache::{CacheHealthCheck, RedisCacheStore, RedisCacheStoreParameters};
pub use write_behind::WriteBehindWriter;
pub use write_through::WriteThroughWriter;
