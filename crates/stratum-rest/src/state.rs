//! Application state for Axum handlers.

use shaku::{HasComponent, Module};
use std::sync::Arc;
use stratum_config::CacheConfig;
use stratum_core::HealthCheck;
use stratum_service::ProductService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<dyn ProductService>,
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
    /// `max-age` advertised to browsers and CDNs for product reads.
    pub http_max_age_secs: u64,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        product_service: Arc<dyn ProductService>,
        health_checks: Vec<Arc<dyn HealthCheck>>,
        http_max_age_secs: u64,
    ) -> Self {
        Self {
            product_service,
            health_checks,
            http_max_age_secs,
        }
    }

    /// Resolves the services from a Shaku module.
    pub fn from_module<M>(
        module: &M,
        cache_config: &CacheConfig,
        health_checks: Vec<Arc<dyn HealthCheck>>,
    ) -> Self
    where
        M: Module + HasComponent<dyn ProductService>,
    {
        Self::new(module.resolve(), health_checks, cache_config.http_max_age_secs)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("health_checks", &self.health_checks.len())
            .field("http_max_age_secs", &self.http_max_age_secs)
            .finish_non_exhaustive()
    }
}
