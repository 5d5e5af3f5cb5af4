//! Cached product service.

use crate::cache::{
    cache_keys, CacheAsideLoader, CacheMetrics, CachePolicy, CacheStore, InvalidationController,
    WriteBehindWriter, WriteThroughWriter,
};
use crate::dto::{
    CacheStatsResponse, CreateProductRequest, ProductListResponse, ProductResponse,
    ProductStatsResponse, ProductSummary, UpdateProductRequest, WarmCacheResponse,
};
use crate::product_service::ProductService;
use crate::CacheExt;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use stratum_core::{
    PageRequest, Product, ProductDetails, ProductId, ProductPatch, ProductStats, StratumError,
    StratumResult, ValidateExt,
};
use stratum_repository::ProductRepository;
use tracing::{debug, info, warn};

/// Maximum number of search results returned.
pub const SEARCH_LIMIT: u32 = 20;

/// Product service that reads through and writes around the cache.
#[derive(Component)]
#[shaku(interface = ProductService)]
pub struct ProductServiceImpl {
    #[shaku(inject)]
    repository: Arc<dyn ProductRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    policy: CachePolicy,
    metrics: CacheMetrics,
}

impl ProductServiceImpl {
    /// Creates a service outside the DI container.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        cache: Arc<dyn CacheStore>,
        policy: CachePolicy,
        metrics: CacheMetrics,
    ) -> Self {
        Self {
            repository,
            cache,
            policy,
            metrics,
        }
    }

    /// Builds the non-injected parameters for the DI module.
    #[must_use]
    pub fn parameters(policy: CachePolicy, metrics: CacheMetrics) -> ProductServiceImplParameters {
        ProductServiceImplParameters { policy, metrics }
    }

    fn loader(&self) -> CacheAsideLoader {
        CacheAsideLoader::new(Arc::clone(&self.cache), self.metrics.clone())
    }

    fn write_through(&self) -> WriteThroughWriter {
        WriteThroughWriter::new(Arc::clone(&self.cache))
    }

    fn write_behind(&self) -> WriteBehindWriter {
        WriteBehindWriter::new(Arc::clone(&self.cache), self.metrics.clone())
    }

    fn invalidator(&self) -> InvalidationController {
        InvalidationController::new(Arc::clone(&self.cache))
    }

    async fn load_details(&self, id: ProductId) -> StratumResult<ProductDetails> {
        let repository = &self.repository;
        self.loader()
            .load_optional(&cache_keys::product(id), self.policy.item_ttl, || async move {
                repository.find_details(id).await
            })
            .await?
            .ok_or_else(|| StratumError::not_found("Product", id))
    }

    async fn load_stats(&self, id: ProductId) -> StratumResult<ProductStats> {
        let repository = &self.repository;
        self.loader()
            .load(&cache_keys::product_stats(id), self.policy.item_ttl, || async move {
                repository.find_stats(id).await
            })
            .await
    }
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    async fn get_product(&self, id: ProductId) -> StratumResult<ProductResponse> {
        debug!("Getting product: {}", id);

        let details = self.load_details(id).await?;
        Ok(ProductResponse::from(details))
    }

    async fn create_product(&self, request: CreateProductRequest) -> StratumResult<ProductResponse> {
        debug!("Creating product: {}", request.name);

        request.validate_request()?;

        let product = Product::from(request);
        let key = cache_keys::product(product.id);
        let repository = self.repository.as_ref();

        let details = self
            .write_through()
            .write(&key, self.policy.item_ttl, || async move {
                let saved = repository.insert(&product).await?;
                repository.attach_details(saved).await
            })
            .await?;

        self.invalidator()
            .invalidate_pattern(cache_keys::PRODUCT_LISTS_PATTERN)
            .await?;

        info!("Product created: {}", details.product.id);
        Ok(ProductResponse::from(details))
    }

    async fn update_product(
        &self,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> StratumResult<ProductResponse> {
        debug!("Updating product: {}", id);

        request.validate_request()?;

        let patch = ProductPatch::from(request);
        if patch.is_empty() {
            return Err(StratumError::validation("No fields to update"));
        }

        let repository = self.repository.as_ref();
        let details = self
            .write_through()
            .write(&cache_keys::product(id), self.policy.item_ttl, || async move {
                let mut product = repository
                    .find_by_id_for_update(id)
                    .await?
                    .ok_or_else(|| StratumError::not_found("Product", id))?;
                product.apply(patch);
                let saved = repository.update(&product).await?;
                repository.attach_details(saved).await
            })
            .await?;

        self.invalidator()
            .invalidate_many(&[
                cache_keys::PRODUCT_LISTS_PATTERN.to_string(),
                cache_keys::product_stats(id),
            ])
            .await?;

        info!("Product updated: {}", id);
        Ok(ProductResponse::from(details))
    }

    async fn delete_product(&self, id: ProductId) -> StratumResult<()> {
        debug!("Deleting product: {}", id);

        if !self.repository.delete(id).await? {
            return Err(StratumError::not_found("Product", id));
        }

        self.invalidator()
            .invalidate_many(&[
                cache_keys::product(id),
                cache_keys::PRODUCT_LISTS_PATTERN.to_string(),
            ])
            .await?;

        info!("Product deleted: {}", id);
        Ok(())
    }

    async fn list_products(&self, page: u32, limit: u32) -> StratumResult<ProductListResponse> {
        let request = PageRequest::new(page, limit);
        debug!("Listing products, page: {}, limit: {}", request.page, request.limit);

        let repository = &self.repository;
        let page = self
            .loader()
            .load(
                &cache_keys::product_list(request.page, request.limit),
                self.policy.list_ttl,
                || async move { repository.find_page(request).await },
            )
            .await?;

        Ok(ProductListResponse::from(page))
    }

    async fn search_products(&self, query: &str) -> StratumResult<Vec<ProductSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StratumError::validation("Search query must not be empty"));
        }

        debug!("Searching products: {}", query);
        let products = self.repository.search(query, SEARCH_LIMIT).await?;
        Ok(products.into_iter().map(ProductSummary::from).collect())
    }

    async fn record_view(&self, id: ProductId) -> StratumResult<ProductStatsResponse> {
        self.load_details(id).await?;

        // Concurrent views of the same product may read the same count.
        let current = self.load_stats(id).await?;
        let stats = ProductStats {
            product_id: id,
            view_count: current.view_count + 1,
        };

        let repository = Arc::clone(&self.repository);
        let view_count = stats.view_count;
        let persist = self
            .write_behind()
            .write(
                &cache_keys::product_stats(id),
                &stats,
                self.policy.item_ttl,
                move || async move { repository.record_views(id, view_count).await },
            )
            .await;
        drop(persist);

        debug!("Recorded view of product {} ({} total)", id, view_count);
        Ok(ProductStatsResponse::from(stats))
    }

    async fn get_product_stats(&self, id: ProductId) -> StratumResult<ProductStatsResponse> {
        self.load_details(id).await?;

        let stats = self.load_stats(id).await?;
        Ok(ProductStatsResponse::from(stats))
    }

    async fn warm_cache(&self) -> StratumResult<WarmCacheResponse> {
        if !self.cache.is_enabled() {
            debug!("Cache disabled, skipping warm-up");
            return Ok(WarmCacheResponse { warmed: 0 });
        }

        let featured = self.repository.find_featured(self.policy.warm_limit).await?;

        let mut warmed = 0;
        for product in featured {
            let id = product.id;
            let details = self.repository.attach_details(product).await?;

            match self
                .cache
                .set(&cache_keys::product(id), &details, self.policy.item_ttl)
                .await
            {
                Ok(()) => warmed += 1,
                Err(e) => warn!("Failed to warm product {}: {}", id, e),
            }
        }

        info!("Cache warmed with {} featured products", warmed);
        Ok(WarmCacheResponse { warmed })
    }

    async fn cache_stats(&self) -> StratumResult<CacheStatsResponse> {
        let enabled = self.cache.is_enabled();
        let size = if enabled {
            match self.cache.size().await {
                Ok(size) => Some(size),
                Err(e) => {
                    warn!("Failed to read cache size: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(CacheStatsResponse {
            enabled,
            hits: self.metrics.hits(),
            misses: self.metrics.misses(),
            hit_rate: self.metrics.hit_rate(),
            size,
            write_behind_failures: self.metrics.write_behind_failures(),
        })
    }
}

impl std::fmt::Debug for ProductServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductServiceImpl")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
