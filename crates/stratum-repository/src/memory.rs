//! In-memory product repository.
//!
//! Used by the service and REST tests. Counts reads so callers can assert
//! how often the backing store was actually consulted, and can be switched
//! into a failing mode to simulate an unavailable database.

use crate::traits::ProductRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use stratum_core::{
    Category, CategoryId, Page, PageRequest, Product, ProductDetails, ProductId, ProductStats,
    Review, StratumError, StratumResult,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    reviews: Vec<Review>,
    stats: HashMap<ProductId, u64>,
}

/// Product repository backed by process memory.
#[derive(Default)]
pub struct InMemoryProductRepository {
    tables: RwLock<Tables>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryProductRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a category.
    pub async fn add_category(&self, category: Category) {
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category);
    }

    /// Stores a review.
    pub async fn add_review(&self, review: Review) {
        self.tables.write().await.reviews.push(review);
    }

    /// Number of read operations served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write operations served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// When set, every operation fails with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn begin_read(&self) -> StratumResult<()> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn begin_write(&self) -> StratumResult<()> {
        self.check_available()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_available(&self) -> StratumResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StratumError::database("backing store unavailable"));
        }
        Ok(())
    }
}

impl Tables {
    fn details_for(&self, product: Product) -> ProductDetails {
        let category = product
            .category_id
            .and_then(|category_id| self.categories.get(&category_id).cloned());

        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|review| review.product_id == product.id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews.truncate(ProductDetails::RECENT_REVIEWS);

        ProductDetails {
            product,
            category,
            reviews,
        }
    }
}

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.into_inner().cmp(&b.id.into_inner()))
    });
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: ProductId) -> StratumResult<Option<Product>> {
        self.begin_read()?;
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn find_by_id_for_update(&self, id: ProductId) -> StratumResult<Option<Product>> {
        self.find_by_id(id).await
    }

    async fn find_details(&self, id: ProductId) -> StratumResult<Option<ProductDetails>> {
        self.begin_read()?;
        let tables = self.tables.read().await;

        Ok(tables
            .products
            .get(&id)
            .cloned()
            .map(|product| tables.details_for(product)))
    }

    async fn attach_details(&self, product: Product) -> StratumResult<ProductDetails> {
        self.begin_read()?;
        Ok(self.tables.read().await.details_for(product))
    }

    async fn find_page(&self, page: PageRequest) -> StratumResult<Page<Product>> {
        self.begin_read()?;
        let tables = self.tables.read().await;

        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        newest_first(&mut products);

        let total = products.len() as u64;
        let content = products
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn search(&self, query: &str, limit: u32) -> StratumResult<Vec<Product>> {
        self.begin_read()?;
        let tables = self.tables.read().await;

        let mut matches: Vec<Product> = tables
            .products
            .values()
            .filter(|product| product.matches(query))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(limit as usize);

        Ok(matches)
    }

    async fn find_featured(&self, limit: u32) -> StratumResult<Vec<Product>> {
        self.begin_read()?;
        let tables = self.tables.read().await;

        let mut featured: Vec<Product> = tables
            .products
            .values()
            .filter(|product| product.featured)
            .cloned()
            .collect();
        newest_first(&mut featured);
        featured.truncate(limit as usize);

        Ok(featured)
    }

    async fn insert(&self, product: &Product) -> StratumResult<Product> {
        self.begin_write()?;
        let mut tables = self.tables.write().await;

        if tables.products.contains_key(&product.id) {
            return Err(StratumError::Conflict(format!(
                "Product {} already exists",
                product.id
            )));
        }
        tables.products.insert(product.id, product.clone());

        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> StratumResult<Product> {
        self.begin_write()?;
        let mut tables = self.tables.write().await;

        match tables.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(product.clone())
            }
            None => Err(StratumError::not_found("Product", product.id)),
        }
    }

    async fn delete(&self, id: ProductId) -> StratumResult<bool> {
        self.begin_write()?;
        let mut tables = self.tables.write().await;

        let removed = tables.products.remove(&id).is_some();
        if removed {
            tables.reviews.retain(|review| review.product_id != id);
            tables.stats.remove(&id);
        }

        Ok(removed)
    }

    async fn find_stats(&self, id: ProductId) -> StratumResult<ProductStats> {
        self.begin_read()?;
        let view_count = self
            .tables
            .read()
            .await
            .stats
            .get(&id)
            .copied()
            .unwrap_or(0);

        Ok(ProductStats {
            product_id: id,
            view_count,
        })
    }

    async fn record_views(&self, id: ProductId, view_count: u64) -> StratumResult<()> {
        self.begin_write()?;
        self.tables.write().await.stats.insert(id, view_count);
        Ok(())
    }
}
