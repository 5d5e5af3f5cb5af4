//! Integration tests for MySqlProductRepository.
//!
//! These tests run against a real MySQL database using testcontainers.
//! Requires Docker to be available on the system.

mod common;

use chrono::{Duration, Utc};
use stratum_core::{
    Category, CategoryId, PageRequest, Product, ProductDetails, ProductId, Review, ReviewId,
    StratumError,
};
use stratum_repository::{MySqlProductRepository, ProductRepository};
use common::TestDatabase;

fn create_test_product(name: &str, featured: bool) -> Product {
    Product::new(
        name.to_string(),
        Some(format!("{} description", name)),
        2500,
        None,
        featured,
    )
}

#[tokio::test]
async fn test_insert_and_find_by_id() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let product = create_test_product("Widget", false);
    repo.insert(&product).await.expect("Failed to insert product");

    let found = repo
        .find_by_id(product.id)
        .await
        .expect("Query failed")
        .expect("Product not found");

    assert_eq!(found.id, product.id);
    assert_eq!(found.name, "Widget");
    assert_eq!(found.price_cents, 2500);
    assert!(!found.featured);
}

#[tokio::test]
async fn test_find_by_id_not_found() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let result = repo.find_by_id(ProductId::new()).await.expect("Query failed");

    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_details_joins_category_and_reviews() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let category = Category {
        id: CategoryId::new(),
        name: "Tools".to_string(),
    };
    db.insert_category(&category).await;

    let mut product = create_test_product("Hammer", false);
    product.category_id = Some(category.id);
    repo.insert(&product).await.expect("Failed to insert product");

    let base = Utc::now() - Duration::hours(1);
    for i in 0..7 {
        db.insert_review(&Review {
            id: ReviewId::new(),
            product_id: product.id,
            rating: 5,
            body: format!("review {}", i),
            created_at: base + Duration::minutes(i),
        })
        .await;
    }

    let details = repo
        .find_details(product.id)
        .await
        .expect("Query failed")
        .expect("Product not found");

    assert_eq!(details.category.map(|c| c.name), Some("Tools".to_string()));
    assert_eq!(details.reviews.len(), ProductDetails::RECENT_REVIEWS);
    assert_eq!(details.reviews[0].body, "review 6");
}

#[tokio::test]
async fn test_find_page() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    for i in 0..5 {
        repo.insert(&create_test_product(&format!("product{}", i), false))
            .await
            .expect("Failed to insert product");
    }

    let page = repo
        .find_page(PageRequest::new(1, 2))
        .await
        .expect("Query failed");

    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages(), 3);
    assert!(page.has_next());
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_literal() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    repo.insert(&create_test_product("Blue Widget", false)).await.unwrap();
    repo.insert(&create_test_product("Gadget", false)).await.unwrap();
    repo.insert(&create_test_product("100% Cotton", false)).await.unwrap();

    let widgets = repo.search("WIDGET", 20).await.expect("Search failed");
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].name, "Blue Widget");

    let literal = repo.search("0%", 20).await.expect("Search failed");
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].name, "100% Cotton");
}

#[tokio::test]
async fn test_find_featured() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    repo.insert(&create_test_product("Featured", true)).await.unwrap();
    repo.insert(&create_test_product("Plain", false)).await.unwrap();

    let featured = repo.find_featured(50).await.expect("Query failed");

    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].name, "Featured");
}

#[tokio::test]
async fn test_update() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let mut product = create_test_product("Before", false);
    repo.insert(&product).await.unwrap();

    product.name = "After".to_string();
    product.price_cents = 999;
    repo.update(&product).await.expect("Failed to update product");

    let found = repo.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(found.name, "After");
    assert_eq!(found.price_cents, 999);
}

#[tokio::test]
async fn test_update_missing_product() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let result = repo.update(&create_test_product("Ghost", false)).await;

    assert!(matches!(result, Err(StratumError::NotFound { .. })));
}

#[tokio::test]
async fn test_delete() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let product = create_test_product("Doomed", false);
    repo.insert(&product).await.unwrap();

    assert!(repo.delete(product.id).await.expect("Delete failed"));
    assert!(repo.find_by_id(product.id).await.unwrap().is_none());
    assert!(!repo.delete(product.id).await.expect("Delete failed"));
}

#[tokio::test]
async fn test_record_views_upserts() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool());

    let product = create_test_product("Popular", false);
    repo.insert(&product).await.unwrap();

    assert_eq!(repo.find_stats(product.id).await.unwrap().view_count, 0);

    repo.record_views(product.id, 3).await.expect("Record failed");
    repo.record_views(product.id, 7).await.expect("Record failed");

    assert_eq!(repo.find_stats(product.id).await.unwrap().view_count, 7);
}

#[tokio::test]
async fn test_reads_fall_back_to_primary_when_replica_is_down() {
    let db = TestDatabase::new().await;
    let writer = MySqlProductRepository::new(db.pool());
    let repo = MySqlProductRepository::new(db.pool_with_unreachable_replica());

    let product = create_test_product("Resilient", true);
    writer.insert(&product).await.unwrap();

    let found = repo
        .find_by_id(product.id)
        .await
        .expect("Fallback read failed")
        .expect("Product not found");
    assert_eq!(found.name, "Resilient");

    assert!(repo.find_details(product.id).await.unwrap().is_some());
    assert_eq!(repo.find_page(PageRequest::new(1, 10)).await.unwrap().total_elements, 1);
    assert!(repo.find_by_id(ProductId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_write_side_reads_use_primary() {
    let db = TestDatabase::new().await;
    let repo = MySqlProductRepository::new(db.pool_with_unreachable_replica());

    let category = Category {
        id: CategoryId::new(),
        name: "Lighting".to_string(),
    };
    db.insert_category(&category).await;

    let mut product = create_test_product("Lamp", false);
    product.category_id = Some(category.id);
    let saved = repo.insert(&product).await.unwrap();

    let fresh = repo
        .find_by_id_for_update(product.id)
        .await
        .unwrap()
        .expect("Product not found");
    assert_eq!(fresh.id, product.id);

    let details = repo.attach_details(saved).await.unwrap();
    assert_eq!(details.category, Some(category));
    assert!(details.reviews.is_empty());
}
