//! MySQL product repository implementation.

use crate::{
    pool::{read_with, read_with_fallback, ReadConsistency},
    traits::ProductRepository,
    DatabasePoolInterface,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use stratum_core::{
    Category, CategoryId, Page, PageRequest, Product, ProductDetails, ProductId, ProductStats,
    Review, ReviewId, StratumError, StratumResult,
};
use tracing::debug;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, category_id, featured, created_at, updated_at";

/// MySQL product repository implementation.
///
/// Reads go through [`read_with_fallback`], writes always hit the primary.
/// Reads that feed a write (`find_by_id_for_update`, `attach_details`) stay
/// on the primary.
#[derive(Component, Clone)]
#[shaku(interface = ProductRepository)]
pub struct MySqlProductRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlProductRepository {
    /// Creates a new MySQL product repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn find_product(
        &self,
        id: ProductId,
        consistency: ReadConsistency,
    ) -> StratumResult<Option<Product>> {
        let id = id.into_inner().to_string();
        let id = id.as_str();

        let row = read_with(self.pool.as_ref(), consistency, |pool| async move {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {} FROM products WHERE id = ?",
                PRODUCT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&pool)
            .await
        })
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn details_for(
        &self,
        product: Product,
        consistency: ReadConsistency,
    ) -> StratumResult<ProductDetails> {
        let category = match product.category_id {
            Some(category_id) => self.find_category(category_id, consistency).await?,
            None => None,
        };
        let reviews = self.find_recent_reviews(product.id, consistency).await?;

        Ok(ProductDetails {
            product,
            category,
            reviews,
        })
    }

    async fn find_category(
        &self,
        id: CategoryId,
        consistency: ReadConsistency,
    ) -> StratumResult<Option<Category>> {
        let id = id.into_inner().to_string();
        let id = id.as_str();

        let row = read_with(self.pool.as_ref(), consistency, |pool| async move {
            sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&pool)
                .await
        })
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn find_recent_reviews(
        &self,
        id: ProductId,
        consistency: ReadConsistency,
    ) -> StratumResult<Vec<Review>> {
        let id = id.into_inner().to_string();
        let id = id.as_str();

        let rows = read_with(self.pool.as_ref(), consistency, |pool| async move {
            sqlx::query_as::<_, ReviewRow>(
                r#"
                SELECT id, product_id, rating, body, created_at
                FROM reviews
                WHERE product_id = ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(id)
            .bind(ProductDetails::RECENT_REVIEWS as i64)
            .fetch_all(&pool)
            .await
        })
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }
}

/// Database row representation of a product.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String, // CHAR(36)
    name: String,
    description: Option<String>,
    price_cents: i64,
    category_id: Option<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: String,
    product_id: String,
    rating: u8,
    body: String,
    created_at: DateTime<Utc>,
}

fn parse_uuid(value: &str) -> StratumResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StratumError::Internal(format!("Invalid UUID in database: {}", e)))
}

impl TryFrom<ProductRow> for Product {
    type Error = StratumError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category_id = row
            .category_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(CategoryId::from_uuid);

        Ok(Product {
            id: ProductId::from_uuid(parse_uuid(&row.id)?),
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            category_id,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = StratumError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::from_uuid(parse_uuid(&row.id)?),
            name: row.name,
        })
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = StratumError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: ReviewId::from_uuid(parse_uuid(&row.id)?),
            product_id: ProductId::from_uuid(parse_uuid(&row.product_id)?),
            rating: row.rating,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn into_products(rows: Vec<ProductRow>) -> StratumResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn find_by_id(&self, id: ProductId) -> StratumResult<Option<Product>> {
        debug!("Finding product by id: {}", id);
        self.find_product(id, ReadConsistency::Eventual).await
    }

    async fn find_by_id_for_update(&self, id: ProductId) -> StratumResult<Option<Product>> {
        debug!("Finding product by id on primary: {}", id);
        self.find_product(id, ReadConsistency::Strong).await
    }

    async fn find_details(&self, id: ProductId) -> StratumResult<Option<ProductDetails>> {
        match self.find_product(id, ReadConsistency::Eventual).await? {
            Some(product) => Ok(Some(
                self.details_for(product, ReadConsistency::Eventual).await?,
            )),
            None => Ok(None),
        }
    }

    async fn attach_details(&self, product: Product) -> StratumResult<ProductDetails> {
        self.details_for(product, ReadConsistency::Strong).await
    }

    async fn find_page(&self, page: PageRequest) -> StratumResult<Page<Product>> {
        debug!("Finding products, page: {}, limit: {}", page.page, page.limit);

        let limit = i64::from(page.limit);
        let offset = page.offset() as i64;

        let (total, rows) = read_with_fallback(self.pool.as_ref(), |pool| async move {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
                .fetch_one(&pool)
                .await?;

            let rows = sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {} FROM products ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
                PRODUCT_COLUMNS
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&pool)
            .await?;

            Ok::<_, sqlx::Error>((total, rows))
        })
        .await?;

        Ok(Page::new(into_products(rows)?, page, total as u64))
    }

    async fn search(&self, query: &str, limit: u32) -> StratumResult<Vec<Product>> {
        debug!("Searching products: {}", query);

        let pattern = like_pattern(query);
        let pattern = pattern.as_str();
        let limit = i64::from(limit);

        let rows = read_with_fallback(self.pool.as_ref(), |pool| async move {
            sqlx::query_as::<_, ProductRow>(&format!(
                r#"
                SELECT {} FROM products
                WHERE LOWER(name) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ?
                ORDER BY name
                LIMIT ?
                "#,
                PRODUCT_COLUMNS
            ))
            .bind(pattern)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&pool)
            .await
        })
        .await?;

        into_products(rows)
    }

    async fn find_featured(&self, limit: u32) -> StratumResult<Vec<Product>> {
        let limit = i64::from(limit);

        let rows = read_with_fallback(self.pool.as_ref(), |pool| async move {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {} FROM products WHERE featured = TRUE ORDER BY created_at DESC LIMIT ?",
                PRODUCT_COLUMNS
            ))
            .bind(limit)
            .fetch_all(&pool)
            .await
        })
        .await?;

        into_products(rows)
    }

    async fn insert(&self, product: &Product) -> StratumResult<Product> {
        debug!("Inserting product: {}", product.name);

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, category_id,
                                  featured, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id.into_inner().to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.category_id.map(|id| id.into_inner().to_string()))
        .bind(product.featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(self.pool.primary())
        .await?;

        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> StratumResult<Product> {
        debug!("Updating product: {}", product.id);

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, price_cents = ?, category_id = ?,
                featured = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.category_id.map(|id| id.into_inner().to_string()))
        .bind(product.featured)
        .bind(product.updated_at)
        .bind(product.id.into_inner().to_string())
        .execute(self.pool.primary())
        .await?;

        // MySQL reports zero affected rows when nothing changed, so confirm existence.
        if result.rows_affected() == 0 && self.find_by_id(product.id).await?.is_none() {
            return Err(StratumError::not_found("Product", product.id));
        }

        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> StratumResult<bool> {
        debug!("Deleting product: {}", id);

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.into_inner().to_string())
            .execute(self.pool.primary())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_stats(&self, id: ProductId) -> StratumResult<ProductStats> {
        let key = id.into_inner().to_string();
        let key = key.as_str();

        let view_count: Option<u64> = read_with_fallback(self.pool.as_ref(), |pool| async move {
            sqlx::query_scalar("SELECT view_count FROM product_stats WHERE product_id = ?")
                .bind(key)
                .fetch_optional(&pool)
                .await
        })
        .await?;

        Ok(ProductStats {
            product_id: id,
            view_count: view_count.unwrap_or(0),
        })
    }

    async fn record_views(&self, id: ProductId, view_count: u64) -> StratumResult<()> {
        debug!("Recording {} views for product: {}", view_count, id);

        sqlx::query(
            r#"
            INSERT INTO product_stats (product_id, view_count, updated_at)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE view_count = VALUES(view_count),
                                    updated_at = VALUES(updated_at)
            "#,
        )
        .bind(id.into_inner().to_string())
        .bind(view_count)
        .bind(Utc::now())
        .execute(self.pool.primary())
        .await?;

        Ok(())
    }
}

impl std::fmt::Debug for MySqlProductRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlProductRepository")
            .finish_non_exhaustive()
    }
}
