//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Data Source Error ==
/// Failure reported by a backing data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// The backing store could not be reached
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    /// The backing store rejected or failed the operation
    #[error("Data source operation failed: {0}")]
    Backend(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid construction-time configuration (unknown policy, bad capacity)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A policy was used in a way it cannot serve
    #[error("{policy} does not support {operation}")]
    Unsupported {
        policy: &'static str,
        operation: &'static str,
    },

    /// Synchronous data source failure
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// Key not found in cache or store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::DataSource(DataSourceError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::DataSource(DataSourceError::Backend(_)) => StatusCode::BAD_GATEWAY,
            CacheError::Config(_) | CacheError::Unsupported { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
