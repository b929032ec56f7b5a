//! Error types for the refresh-ahead cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the request-serving path.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Transport or protocol failure talking to the cache store
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    /// The origin has no such resource
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The origin failed to produce the resource
    #[error("Loader failed: {0}")]
    Loader(String),

    /// The origin did not answer before the loader deadline
    #[error("Loader timed out after {0:?}")]
    LoaderTimeout(Duration),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LoaderError> for CacheError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::NotFound(id) => CacheError::NotFound(id),
            other => CacheError::Loader(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// == Loader Error Enum ==
/// Errors raised by an origin loader.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("{0}")]
    NotFound(String),

    #[error("origin error: {0}")]
    Origin(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) => StatusCode::BAD_GATEWAY,
            CacheError::LoaderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
