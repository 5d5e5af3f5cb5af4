//! Cache administration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cache counters and store size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CacheStatsResponse {
    /// Whether a cache store is active.
    pub enabled: bool,
    pub hits: u64,
    pub misses: u64,
    /// Hits over total reads, 0.0 before any read.
    pub hit_rate: f64,
    /// Live entries in the store; absent when the store could not be reached.
    pub size: Option<u64>,
    pub write_behind_failures: u64,
}

/// Result of a cache warm-up run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WarmCacheResponse {
    /// Number of product entries written.
    pub warmed: usize,
}
