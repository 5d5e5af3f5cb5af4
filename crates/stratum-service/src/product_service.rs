//! Product service trait definition.

use crate::dto::{
    CacheStatsResponse, CreateProductRequest, ProductListResponse, ProductResponse,
    ProductStatsResponse, ProductSummary, UpdateProductRequest, WarmCacheResponse,
};
use async_trait::async_trait;
use stratum_core::{Interface, ProductId, StratumResult};

/// Product service trait.
///
/// Reads are served through the cache; writes keep `product:{id}` current and
/// invalidate the listings they affect.
#[async_trait]
pub trait ProductService: Interface + Send + Sync {
    /// Gets a product with its category and recent reviews.
    async fn get_product(&self, id: ProductId) -> StratumResult<ProductResponse>;

    /// Creates a new product.
    async fn create_product(&self, request: CreateProductRequest) -> StratumResult<ProductResponse>;

    /// Merges the set fields of `request` into a stored product.
    async fn update_product(
        &self,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> StratumResult<ProductResponse>;

    /// Deletes a product.
    async fn delete_product(&self, id: ProductId) -> StratumResult<()>;

    /// Lists products newest first. `page` is 1-based; `limit` is clamped.
    async fn list_products(&self, page: u32, limit: u32) -> StratumResult<ProductListResponse>;

    /// Searches names and descriptions. Never cached.
    async fn search_products(&self, query: &str) -> StratumResult<Vec<ProductSummary>>;

    /// Counts a view and returns the new total.
    async fn record_view(&self, id: ProductId) -> StratumResult<ProductStatsResponse>;

    /// Gets the view statistics of a product.
    async fn get_product_stats(&self, id: ProductId) -> StratumResult<ProductStatsResponse>;

    /// Pre-loads featured products into the cache.
    async fn warm_cache(&self) -> StratumResult<WarmCacheResponse>;

    /// Reports cache counters and store size.
    async fn cache_stats(&self) -> StratumResult<CacheStatsResponse>;
}
