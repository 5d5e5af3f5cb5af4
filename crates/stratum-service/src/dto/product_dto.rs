//! Product-related DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stratum_core::{
    rules, Category, CategoryId, Page, Product, ProductDetails, ProductId, ProductPatch,
    ProductStats, Review, ReviewId,
};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a new product.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "rules::not_blank", message = "Name must not be blank")
    )]
    pub name: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: i64,

    pub category_id: Option<CategoryId>,

    #[serde(default)]
    pub featured: bool,
}

impl From<CreateProductRequest> for Product {
    fn from(request: CreateProductRequest) -> Self {
        Product::new(
            request.name.trim().to_string(),
            request.description,
            request.price_cents,
            request.category_id,
            request.featured,
        )
    }
}

/// Partial product update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "rules::not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: Option<i64>,

    pub category_id: Option<CategoryId>,

    pub featured: Option<bool>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name.map(|name| name.trim().to_string()),
            description: request.description,
            price_cents: request.price_cents,
            category_id: request.category_id,
            featured: request.featured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub rating: u8,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            body: review.body,
            created_at: review.created_at,
        }
    }
}

/// Product with its category and most recent reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub featured: bool,
    pub category: Option<CategoryResponse>,
    pub reviews: Vec<ReviewResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDetails> for ProductResponse {
    fn from(details: ProductDetails) -> Self {
        let ProductDetails {
            product,
            category,
            reviews,
        } = details;

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            featured: product.featured,
            category: category.map(CategoryResponse::from),
            reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product without relations, as listed and searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<CategoryId>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            category_id: product.category_id,
            featured: product.featured,
            created_at: product.created_at,
        }
    }
}

/// Product list response with pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummary>,
    pub page: u32,
    pub limit: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<Page<Product>> for ProductListResponse {
    fn from(page: Page<Product>) -> Self {
        let total_pages = page.total_pages();
        Self {
            page: page.page,
            limit: page.limit,
            total_elements: page.total_elements,
            total_pages,
            products: page.content.into_iter().map(ProductSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductStatsResponse {
    pub product_id: ProductId,
    pub view_count: u64,
}

impl From<ProductStats> for ProductStatsResponse {
    fn from(stats: ProductStats) -> Self {
        Self {
            product_id: stats.product_id,
            view_count: stats.view_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::{PageRequest, ValidateExt};

    fn create_request(name: &str, price_cents: i64) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: None,
            price_cents,
            category_id: None,
            featured: false,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(create_request("Lamp", 1999).validate().is_ok());
        assert!(create_request("", 1999).validate().is_err());
        assert!(create_request("   ", 1999).validate().is_err());
        assert!(create_request("Lamp", -1).validate().is_err());
    }

    #[test]
    fn test_create_request_deserializes_without_featured() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name":"Lamp","price_cents":500}"#).unwrap();
        assert!(!request.featured);
        assert!(request.description.is_none());
    }

    #[test]
    fn test_update_request_validates_present_fields_only() {
        assert!(UpdateProductRequest::default().validate_request().is_ok());

        let request = UpdateProductRequest {
            price_cents: Some(-5),
            ..Default::default()
        };
        assert!(request.validate_request().is_err());
    }

    #[test]
    fn test_update_request_into_patch_trims_name() {
        let patch = ProductPatch::from(UpdateProductRequest {
            name: Some("  Desk Lamp ".to_string()),
            ..Default::default()
        });
        assert_eq!(patch.name.as_deref(), Some("Desk Lamp"));
        assert!(patch.price_cents.is_none());
    }

    #[test]
    fn test_product_response_from_details() {
        let product = Product::new("Lamp".to_string(), None, 1999, None, true);
        let id = product.id;
        let response = ProductResponse::from(ProductDetails {
            product,
            category: None,
            reviews: Vec::new(),
        });

        assert_eq!(response.id, id);
        assert!(response.featured);
        assert!(response.category.is_none());
        assert!(response.reviews.is_empty());
    }

    #[test]
    fn test_list_response_from_page() {
        let products = vec![
            Product::new("A".to_string(), None, 1, None, false),
            Product::new("B".to_string(), None, 2, None, false),
        ];
        let page = Page::new(products, PageRequest::new(1, 2), 5);
        let response = ProductListResponse::from(page);

        assert_eq!(response.products.len(), 2);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.limit, 2);
    }
}
