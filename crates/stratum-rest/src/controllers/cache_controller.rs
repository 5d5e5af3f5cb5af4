//! Cache administration controller.

use crate::{
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use stratum_service::{CacheStatsResponse, WarmCacheResponse};
use tracing::info;

/// Creates the cache router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/warm", post(warm_cache))
        .route("/stats", get(cache_stats))
}

/// Pre-load featured products into the cache.
#[utoipa::path(
    post,
    path = "/cache/warm",
    tag = "cache",
    responses(
        (status = 200, description = "Number of entries written", body = WarmCacheResponse)
    )
)]
pub async fn warm_cache(State(state): State<AppState>) -> ApiResult<WarmCacheResponse> {
    info!("Cache warm-up requested");

    let response = state.product_service.warm_cache().await?;
    ok(response)
}

/// Cache hit/miss counters and store size.
#[utoipa::path(
    get,
    path = "/cache/stats",
    tag = "cache",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsResponse)
    )
)]
pub async fn cache_stats(State(state): State<AppState>) -> ApiResult<CacheStatsResponse> {
    let response = state.product_service.cache_stats().await?;
    ok(response)
}
