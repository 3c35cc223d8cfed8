//! Error types for the cache service
//!
//! Provides unified error handling using thiserror. Transport-level variants
//! never leave the cache layer: `CacheService` counts and logs them, then
//! returns a safe default. Only the HTTP surface turns errors into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Command failed on the Redis connection
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Transport round-trip exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// No live transport connection
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// True for failures of the transport itself (as opposed to bad payloads).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CacheError::Redis(_) | CacheError::Timeout(_) | CacheError::Unavailable(_)
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Redis(_) | CacheError::Timeout(_) | CacheError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;
