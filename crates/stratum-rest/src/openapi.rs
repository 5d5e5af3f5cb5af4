//! OpenAPI documentation for the REST API.

use crate::controllers::health_controller::{ComponentHealth, HealthResponse};
use stratum_core::{CategoryId, ErrorResponse, FieldError, ProductId, ReviewId};
use stratum_service::{
    CacheStatsResponse, CategoryResponse, CreateProductRequest, ProductListResponse,
    ProductResponse, ProductStatsResponse, ProductSummary, ReviewResponse, UpdateProductRequest,
    WarmCacheResponse,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Stratum API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stratum API",
        version = "1.0.0",
        description = "Product catalog served through a Redis cache layer",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        crate::controllers::product_controller::get_product,
        crate::controllers::product_controller::list_products,
        crate::controllers::product_controller::create_product,
        crate::controllers::product_controller::update_product,
        crate::controllers::product_controller::delete_product,
        crate::controllers::product_controller::search_products,
        crate::controllers::product_controller::get_product_stats,
        crate::controllers::product_controller::record_view,
        crate::controllers::cache_controller::warm_cache,
        crate::controllers::cache_controller::cache_stats,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            ProductId,
            CategoryId,
            ReviewId,
            ErrorResponse,
            FieldError,
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            ProductSummary,
            ProductListResponse,
            ProductStatsResponse,
            CategoryResponse,
            ReviewResponse,
            CacheStatsResponse,
            WarmCacheResponse,
            HealthResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "products", description = "Cached product catalog"),
        (name = "cache", description = "Cache administration"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
