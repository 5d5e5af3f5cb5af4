//! HTTP tests for the product and cache endpoints, run against in-memory
//! stores.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use stratum_config::ServerConfig;
use stratum_core::{HealthCheck, HealthStatus};
use stratum_repository::InMemoryProductRepository;
use stratum_rest::{create_router, AppState};
use stratum_service::{CacheMetrics, CachePolicy, InMemoryCacheStore, ProductServiceImpl};
use tower::ServiceExt;

const MAX_AGE: u64 = 600;

struct StaticCheck(HealthStatus);

#[async_trait]
impl HealthCheck for StaticCheck {
    fn name(&self) -> &str {
        "static"
    }

    async fn check(&self) -> HealthStatus {
        self.0.clone()
    }
}

fn app_with_checks(health_checks: Vec<Arc<dyn HealthCheck>>) -> Router {
    let service = Arc::new(ProductServiceImpl::new(
        Arc::new(InMemoryProductRepository::new()),
        Arc::new(InMemoryCacheStore::new()),
        CachePolicy::default(),
        CacheMetrics::new(),
    ));
    let state = AppState::new(service, health_checks, MAX_AGE);
    create_router(state, &ServerConfig::default())
}

fn app() -> Router {
    app_with_checks(Vec::new())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

async fn create(app: &Router, name: &str, featured: bool) -> String {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/v1/products",
        Some(json!({
            "name": name,
            "description": format!("{} for the desk", name),
            "price_cents": 4999,
            "featured": featured
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_get_product_sets_cache_headers() {
    let app = app();
    let id = create(&app, "Lamp", false).await;

    let (status, headers, body) = send(&app, Method::GET, &format!("/api/v1/products/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Lamp");
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=600, s-maxage=600"
    );
    assert_eq!(headers["cdn-cache-control"], "max-age=600");
    assert!(headers[header::EXPIRES].to_str().unwrap().ends_with(" GMT"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_get_missing_product_returns_404() {
    let app = app();

    let (status, headers, body) = send(
        &app,
        Method::GET,
        "/api/v1/products/550e8400-e29b-41d4-a716-446655440000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(!headers.contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn test_malformed_id_returns_400() {
    let app = app();

    let (status, _, body) = send(&app, Method::GET, "/api/v1/products/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_rejects_invalid_product() {
    let app = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({ "name": "Lamp", "price_cents": -1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_reflects_created_products() {
    let app = app();

    let (_, _, empty) = send(&app, Method::GET, "/api/v1/products?page=1&limit=10", None).await;
    assert_eq!(empty["data"]["total_elements"], 0);

    create(&app, "Lamp", false).await;
    create(&app, "Chair", false).await;

    let (status, _, body) = send(&app, Method::GET, "/api/v1/products?page=1&limit=10", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_elements"], 2);
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["limit"], 10);
}

#[tokio::test]
async fn test_update_then_delete() {
    let app = app();
    let id = create(&app, "Lamp", false).await;
    let uri = format!("/api/v1/products/{}", id);

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "price_cents": 1999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price_cents"], 1999);
    assert_eq!(body["data"]["name"], "Lamp");

    let (_, _, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["price_cents"], 1999);

    let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search() {
    let app = app();
    create(&app, "Desk Lamp", false).await;
    create(&app, "Chair", false).await;

    let (status, _, body) = send(&app, Method::GET, "/api/v1/products/search?q=lamp", None).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Desk Lamp");

    let (status, _, _) = send(&app, Method::GET, "/api/v1/products/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_views_and_stats() {
    let app = app();
    let id = create(&app, "Lamp", false).await;

    let (status, _, body) = send(&app, Method::POST, &format!("/api/v1/products/{}/views", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["view_count"], 1);

    send(&app, Method::POST, &format!("/api/v1/products/{}/views", id), None).await;

    let (status, _, body) = send(&app, Method::GET, &format!("/api/v1/products/{}/stats", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["view_count"], 2);
}

#[tokio::test]
async fn test_cache_warm_and_stats() {
    let app = app();
    create(&app, "Lamp", true).await;
    create(&app, "Chair", true).await;
    create(&app, "Rug", false).await;

    let (status, _, body) = send(&app, Method::POST, "/api/v1/cache/warm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["warmed"], 2);

    let (status, _, body) = send(&app, Method::GET, "/api/v1/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["size"], 3);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app_with_checks(vec![Arc::new(StaticCheck(HealthStatus::Degraded(
        "slow".to_string(),
    )))]);

    let (status, _, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"][0]["message"], "slow");

    let (status, _, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/live", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_when_a_dependency_is_down() {
    let app = app_with_checks(vec![Arc::new(StaticCheck(HealthStatus::Unhealthy(
        "connection refused".to_string(),
    )))]);

    let (status, _, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
