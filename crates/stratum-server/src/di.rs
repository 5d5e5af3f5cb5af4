//! Dependency injection module using Shaku.
//!
//! `StratumModule` wires the MySQL pool and repository, the cache store and
//! the product service. The cache store implementation is picked from
//! [`CacheBackend`] once, while the module is built.

use std::sync::Arc;
use stratum_config::{AppConfig, CacheBackend};
use stratum_core::{module, HasComponent, StratumResult};
use stratum_repository::{DatabasePool, DatabasePoolInterface, MySqlProductRepository};
use stratum_service::{
    CacheMetrics, CachePolicy, CacheStore, InMemoryCacheStore, ProductService,
    ProductServiceImpl, RedisCacheStore,
};
use tracing::info;

module! {
    pub StratumModule {
        components = [
            DatabasePool,
            MySqlProductRepository,
            RedisCacheStore,
            ProductServiceImpl,
        ],
        providers = [],
    }
}

/// Connects to the backing store and the configured cache, and builds the
/// module.
///
/// `metrics` is shared with the product service so the caller can read the
/// same counters.
pub async fn build_module(
    config: &AppConfig,
    metrics: CacheMetrics,
) -> StratumResult<Arc<StratumModule>> {
    let db_pool = DatabasePool::new(&config.database).await?;

    let builder = StratumModule::builder()
        .with_component_parameters::<DatabasePool>(db_pool.into_parameters())
        .with_component_parameters::<ProductServiceImpl>(ProductServiceImpl::parameters(
            CachePolicy::from(&config.cache),
            metrics,
        ));

    let builder = match config.cache.backend {
        CacheBackend::Redis => {
            let store = RedisCacheStore::connect(&config.redis).await?;
            builder.with_component_parameters::<RedisCacheStore>(store.into_parameters())
        }
        CacheBackend::Memory => {
            builder.with_component_override::<dyn CacheStore>(Box::new(InMemoryCacheStore::new()))
        }
        CacheBackend::Disabled => builder.with_component_parameters::<RedisCacheStore>(
            RedisCacheStore::disabled().into_parameters(),
        ),
    };

    info!(backend = %config.cache.backend, "Cache store selected");
    Ok(Arc::new(builder.build()))
}

/// Resolves the components the server needs after wiring.
pub trait ComponentResolver {
    fn product_service(&self) -> Arc<dyn ProductService>;

    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;

    fn cache_store(&self) -> Arc<dyn CacheStore>;
}

impl ComponentResolver for StratumModule {
    fn product_service(&self) -> Arc<dyn ProductService> {
        self.resolve()
    }

    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }

    fn cache_store(&self) -> Arc<dyn CacheStore> {
        self.resolve()
    }
}
