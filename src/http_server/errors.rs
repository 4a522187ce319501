//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::schema::{SchemaError, SchemaErrorKind};
use crate::store::{StoreError, StoreErrorKind};

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Schema resolution or consistency failure
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Store failure
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Schema(e) => ApiError::Schema(e),
            IngestError::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Schema(e) => match e.kind() {
                SchemaErrorKind::NotFound => StatusCode::NOT_FOUND,
                SchemaErrorKind::Load => StatusCode::INTERNAL_SERVER_ERROR,
                SchemaErrorKind::Malformed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(e) => match e.kind() {
                StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                StoreErrorKind::Conflict => StatusCode::CONFLICT,
                StoreErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                StoreErrorKind::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
