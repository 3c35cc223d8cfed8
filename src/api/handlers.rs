//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{keys, CacheService, CacheStats, HealthReport};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, GetResponse, KeyResponse, ListKeyRequest, MessageResponse, MgetRequest,
    MgetResponse, MsetRequest, PrefixQuery, SearchKeyRequest, SetRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache service
    pub cache: Arc<CacheService>,
}

impl AppState {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }
}

fn check(problem: Option<String>) -> Result<()> {
    match problem {
        Some(message) => Err(CacheError::InvalidRequest(message)),
        None => Ok(()),
    }
}

/// Handler for GET /health
///
/// Always 200; cache trouble shows up in the body, not the status.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.cache.health().await)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Handler for POST /stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    state.cache.reset_stats();
    Json(state.cache.stats())
}

/// Handler for GET /cache/:key
///
/// A miss (or an unavailable cache) is a 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PrefixQuery>,
) -> Result<Json<GetResponse>> {
    check(validate_key(&key).or_else(|| query.validate()))?;

    match state.cache.get::<Value>(&key, &query.options()).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /cache/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PrefixQuery>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    check(
        validate_key(&key)
            .or_else(|| query.validate())
            .or_else(|| req.validate()),
    )?;

    state
        .cache
        .set(&key, &req.value, &req.options(&query))
        .await;
    Ok(Json(MessageResponse::new(format!("Key '{}' set", key))))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<PrefixQuery>,
) -> Result<Json<MessageResponse>> {
    check(validate_key(&key).or_else(|| query.validate()))?;

    state.cache.delete(&key, &query.options()).await;
    Ok(Json(MessageResponse::new(format!("Key '{}' deleted", key))))
}

/// Handler for DELETE /cache
///
/// Without `?prefix=` every entry in the namespace goes.
pub async fn flush_handler(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> Result<Json<MessageResponse>> {
    check(query.validate())?;

    state.cache.flush(query.prefix.as_deref()).await;
    let message = match query.prefix.as_deref() {
        Some(prefix) => format!("Flushed prefix '{}'", prefix),
        None => "Flushed all entries".to_string(),
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Handler for POST /cache/mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MgetRequest>,
) -> Result<Json<MgetResponse>> {
    check(req.validate())?;

    let values = state
        .cache
        .mget::<Value, String>(&req.keys, &req.options())
        .await;
    Ok(Json(MgetResponse { values }))
}

/// Handler for POST /cache/mset
pub async fn mset_handler(
    State(state): State<AppState>,
    Json(req): Json<MsetRequest>,
) -> Result<Json<MessageResponse>> {
    check(req.validate())?;

    let opts = req.options();
    let pairs = req.into_pairs();
    state.cache.mset(pairs.as_slice(), &opts).await;
    Ok(Json(MessageResponse::new(format!("{} keys set", pairs.len()))))
}

/// Handler for POST /keys/list
pub async fn list_key_handler(Json(req): Json<ListKeyRequest>) -> Json<KeyResponse> {
    Json(KeyResponse {
        key: keys::video_list(&req.filters, req.page, req.limit),
    })
}

/// Handler for POST /keys/search
pub async fn search_key_handler(Json(req): Json<SearchKeyRequest>) -> Json<KeyResponse> {
    Json(KeyResponse {
        key: keys::search(&req.query, &req.filters),
    })
}
