//! Repository trait definitions.

use async_trait::async_trait;
use stratum_core::{
    Interface, Page, PageRequest, Product, ProductDetails, ProductId, ProductStats, StratumResult,
};

/// Product repository trait.
///
/// Every method may fail with a store-specific error, surfaced as
/// `StratumError::Database`.
#[async_trait]
pub trait ProductRepository: Interface + Send + Sync {
    /// Finds a product by ID.
    async fn find_by_id(&self, id: ProductId) -> StratumResult<Option<Product>>;

    /// Finds a product by ID on the primary, bypassing any read replica.
    ///
    /// Use before a read-modify-write so the merge starts from the latest row.
    async fn find_by_id_for_update(&self, id: ProductId) -> StratumResult<Option<Product>>;

    /// Finds a product with its category and most recent reviews.
    async fn find_details(&self, id: ProductId) -> StratumResult<Option<ProductDetails>>;

    /// Loads the category and most recent reviews of a product that was just
    /// written, reading from the primary. `product` is kept as given.
    async fn attach_details(&self, product: Product) -> StratumResult<ProductDetails>;

    /// Lists products, newest first.
    async fn find_page(&self, page: PageRequest) -> StratumResult<Page<Product>>;

    /// Case-insensitive substring search over name and description.
    async fn search(&self, query: &str, limit: u32) -> StratumResult<Vec<Product>>;

    /// Lists featured products, newest first.
    async fn find_featured(&self, limit: u32) -> StratumResult<Vec<Product>>;

    /// Inserts a new product.
    async fn insert(&self, product: &Product) -> StratumResult<Product>;

    /// Updates an existing product. Fails with `NotFound` if it does not exist.
    async fn update(&self, product: &Product) -> StratumResult<Product>;

    /// Deletes a product by ID. Returns whether a row was removed.
    async fn delete(&self, id: ProductId) -> StratumResult<bool>;

    /// Reads the persisted view statistics for a product.
    async fn find_stats(&self, id: ProductId) -> StratumResult<ProductStats>;

    /// Overwrites the persisted view count for a product.
    async fn record_views(&self, id: ProductId, view_count: u64) -> StratumResult<()>;
}
