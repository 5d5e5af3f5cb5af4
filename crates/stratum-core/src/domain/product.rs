//! Product entity and its related records.

use crate::{CategoryId, ProductId, ReviewId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product entity as stored in the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier for the product.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Free-form description.
    pub description: Option<String>,

    /// Price in the smallest currency unit.
    pub price_cents: i64,

    /// Owning category, if any.
    pub category_id: Option<CategoryId>,

    /// Whether the product is promoted (and pre-loaded into the cache).
    pub featured: bool,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a fresh ID.
    #[must_use]
    pub fn new(
        name: String,
        description: Option<String>,
        price_cents: i64,
        category_id: Option<CategoryId>,
        featured: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            name,
            description,
            price_cents,
            category_id,
            featured,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the set fields of `patch` into this product.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price_cents) = patch.price_cents {
            self.price_cents = price_cents;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match against name and description.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Partial update for a product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub featured: Option<bool>,
}

impl ProductPatch {
    /// Returns true when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.category_id.is_none()
            && self.featured.is_none()
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    /// Rating from 1 to 5.
    pub rating: u8,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A product with its eager-loaded relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    /// Most recent reviews, newest first.
    pub reviews: Vec<Review>,
}

impl ProductDetails {
    /// Number of reviews loaded alongside a product.
    pub const RECENT_REVIEWS: usize = 5;
}

/// Derived aggregate for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_id: ProductId,
    pub view_count: u64,
}

impl ProductStats {
    /// Stats for a product that has never been viewed.
    #[must_use]
    pub const fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            view_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> Product {
        Product::new(
            "Desk Lamp".to_string(),
            Some("Warm LED light".to_string()),
            2999,
            None,
            false,
        )
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut product = lamp();
        let before = product.updated_at;

        product.apply(ProductPatch {
            price_cents: Some(2499),
            featured: Some(true),
            ..ProductPatch::default()
        });

        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.description.as_deref(), Some("Warm LED light"));
        assert_eq!(product.price_cents, 2499);
        assert!(product.featured);
        assert!(product.updated_at >= before);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let product = lamp();
        assert!(product.matches("desk"));
        assert!(product.matches("LED"));
        assert!(!product.matches("chair"));
    }

    #[test]
    fn test_matches_without_description() {
        let mut product = lamp();
        product.description = None;
        assert!(product.matches("lamp"));
        assert!(!product.matches("warm"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            name: Some("x".to_string()),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_details_flatten_product_fields() {
        let details = ProductDetails {
            product: lamp(),
            category: None,
            reviews: Vec::new(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "Desk Lamp");
        assert!(json["reviews"].as_array().unwrap().is_empty());
        let back: ProductDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }
}
