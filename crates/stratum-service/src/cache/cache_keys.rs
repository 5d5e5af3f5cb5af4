//! Cache key generators.
//!
//! Every key a write path stores must be derivable by the invalidation path
//! that removes it, so both sides build keys here.

use stratum_core::ProductId;

/// Pattern matching every cached product listing page.
pub const PRODUCT_LISTS_PATTERN: &str = "products:list:*";

/// Key for a single product with its details.
#[must_use]
pub fn product(id: ProductId) -> String {
    format!("product:{}", id)
}

/// Key for one page of the product listing.
#[must_use]
pub fn product_list(page: u32, limit: u32) -> String {
    format!("products:list:{}:{}", page, limit)
}

/// Key for a product's view statistics.
#[must_use]
pub fn product_stats(id: ProductId) -> String {
    format!("product:{}:stats", id)
}
