//! Expiry and warming policy applied by the product service.

use std::time::Duration;
use stratum_config::CacheConfig;

/// How long each kind of entry lives, and how much to warm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// TTL of `product:{id}` and `product:{id}:stats`.
    pub item_ttl: Duration,
    /// TTL of `products:list:{page}:{limit}`.
    pub list_ttl: Duration,
    /// Maximum number of featured products pre-loaded by warming.
    pub warm_limit: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            item_ttl: Duration::from_secs(3600),
            list_ttl: Duration::from_secs(300),
            warm_limit: 50,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            item_ttl: config.item_ttl(),
            list_ttl: config.list_ttl(),
            warm_limit: config.warm_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_matches_default_config() {
        assert_eq!(CachePolicy::from(&CacheConfig::default()), CachePolicy::default());
    }

    #[test]
    fn test_policy_from_config() {
        let config = CacheConfig {
            item_ttl_secs: 60,
            list_ttl_secs: 10,
            warm_limit: 5,
            ..Default::default()
        };
        let policy = CachePolicy::from(&config);

        assert_eq!(policy.item_ttl, Duration::from_secs(60));
        assert_eq!(policy.list_ttl, Duration::from_secs(10));
        assert_eq!(policy.warm_limit, 5);
    }
}
