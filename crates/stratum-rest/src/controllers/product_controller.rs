//! Product catalog controller.

use crate::{
    extractors::{PaginationQuery, SearchQuery},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use stratum_core::{ErrorResponse, PageRequest, ProductId, StratumError};
use stratum_service::{
    CreateProductRequest, ProductListResponse, ProductResponse, ProductStatsResponse,
    ProductSummary, UpdateProductRequest,
};
use tracing::debug;

/// Format of the `Expires` header (RFC 1123, always GMT).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

static CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");

/// Creates the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/stats", get(get_product_stats))
        .route("/:id/views", post(record_view))
}

/// Get a product with its category and recent reviews.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Get product request: {}", id);

    let product_id = parse_product_id(&id)?;
    let response = state.product_service.get_product(product_id).await?;
    let headers = cache_headers(state.http_max_age_secs, Utc::now())?;

    Ok((headers, Json(ApiResponse::success(response))))
}

/// List products, newest first.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<ProductListResponse> {
    let page = PageRequest::from(pagination);
    debug!("List products request: page {}, limit {}", page.page, page.limit);

    let response = state
        .product_service
        .list_products(page.page, page.limit)
        .await?;
    ok(response)
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product", body = ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), AppError> {
    debug!("Create product request: {}", request.name);

    let response = state.product_service.create_product(request).await?;
    Ok(created(response))
}

/// Update the given fields of a product.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    debug!("Update product request: {}", id);

    let product_id = parse_product_id(&id)?;
    let response = state
        .product_service
        .update_product(product_id, request)
        .await?;
    ok(response)
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete product request: {}", id);

    let product_id = parse_product_id(&id)?;
    state.product_service.delete_product(product_id).await?;

    Ok(no_content())
}

/// Search product names and descriptions.
#[utoipa::path(
    get,
    path = "/products/search",
    tag = "products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 20 matching products", body = [ProductSummary]),
        (status = 400, description = "Empty query", body = ErrorResponse)
    )
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ProductSummary>> {
    debug!("Search products request: {}", query.q);

    let response = state.product_service.search_products(&query.q).await?;
    ok(response)
}

/// Get the view statistics of a product.
#[utoipa::path(
    get,
    path = "/products/{id}/stats",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "View statistics", body = ProductStatsResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProductStatsResponse> {
    let product_id = parse_product_id(&id)?;
    let response = state.product_service.get_product_stats(product_id).await?;
    ok(response)
}

/// Count a view of a product.
#[utoipa::path(
    post,
    path = "/products/{id}/views",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Updated view statistics", body = ProductStatsResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProductStatsResponse> {
    let product_id = parse_product_id(&id)?;
    let response = state.product_service.record_view(product_id).await?;
    ok(response)
}

/// Builds the browser and CDN caching headers for a response produced at
/// `now`.
fn cache_headers(max_age_secs: u64, now: DateTime<Utc>) -> Result<HeaderMap, AppError> {
    let expires = i64::try_from(max_age_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(now);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        header_value(format!("public, max-age={0}, s-maxage={0}", max_age_secs))?,
    );
    headers.insert(
        CDN_CACHE_CONTROL.clone(),
        header_value(format!("max-age={}", max_age_secs))?,
    );
    headers.insert(
        header::EXPIRES,
        header_value(expires.format(HTTP_DATE_FORMAT).to_string())?,
    );
    Ok(headers)
}

fn header_value(value: String) -> Result<HeaderValue, AppError> {
    HeaderValue::try_from(value)
        .map_err(|e| AppError(StratumError::internal(format!("Invalid header value: {}", e))))
}

/// Helper to parse a product ID from a path parameter.
fn parse_product_id(id: &str) -> Result<ProductId, AppError> {
    ProductId::parse(id)
        .map_err(|_| AppError(StratumError::validation(format!("Invalid product ID: {}", id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cache_headers() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let headers = cache_headers(3600, now).unwrap();

        assert_eq!(
            headers[header::CACHE_CONTROL],
            "public, max-age=3600, s-maxage=3600"
        );
        assert_eq!(headers["cdn-cache-control"], "max-age=3600");
        assert_eq!(headers[header::EXPIRES], "Thu, 01 Jan 2026 13:00:00 GMT");
    }

    #[test]
    fn test_parse_product_id() {
        assert!(parse_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());

        let err = parse_product_id("not-a-uuid").unwrap_err();
        assert!(matches!(err.0, StratumError::Validation(_)));
    }
}
