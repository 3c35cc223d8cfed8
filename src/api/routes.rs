//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, flush_handler, get_handler, health_handler, list_key_handler, mget_handler,
    mset_handler, reset_stats_handler, search_key_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Ping the transport, report status and counters
/// - `GET /stats` - Cache statistics
/// - `POST /stats/reset` - Zero the counters
/// - `GET|PUT|DELETE /cache/:key` - Single-key read, write, delete (`?prefix=`)
/// - `DELETE /cache` - Flush a prefix or the whole namespace
/// - `POST /cache/mget`, `POST /cache/mset` - Batch read and write
/// - `POST /keys/list`, `POST /keys/search` - Preview derived query keys
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/reset", post(reset_stats_handler))
        .route("/cache", delete(flush_handler))
        .route("/cache/mget", post(mget_handler))
        .route("/cache/mset", post(mset_handler))
        .route(
            "/cache/:key",
            get(get_handler).put(set_handler).delete(delete_handler),
        )
        .route("/keys/list", post(list_key_handler))
        .route("/keys/search", post(search_key_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheService, TtlPolicy};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn disabled_app() -> Router {
        let cache = Arc::new(CacheService::disabled("fabl", TtlPolicy::default()));
        create_router(AppState::new(cache))
    }

    #[tokio::test]
    async fn test_health_endpoint_without_cache() {
        let response = disabled_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = disabled_app()
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_without_cache_still_succeeds() {
        let response = disabled_app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache/test")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_without_cache_is_not_found() {
        let response = disabled_app()
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
