//! Application error types.
//!
//! Every fallible operation in the services returns [`AppResult`]. Errors
//! raised while talking to a configured data source are usually caught by
//! the caller and turned into a message on the page; the [`IntoResponse`]
//! implementation covers the JSON endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Convenience alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// The named driver is not one this build can load.
    #[error("driver load error: {0}")]
    DriverLoad(String),

    /// A connection to a data source could not be opened.
    #[error("connection error: {0}")]
    DatabaseConnection(String),

    /// A statement failed to execute or its rows could not be decoded.
    #[error("query error: {0}")]
    DatabaseQuery(String),

    /// The data source did not answer within the configured bound.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DriverLoad(_) => "DRIVER_LOAD_ERROR",
            AppError::DatabaseConnection(_) => "CONNECTION_ERROR",
            AppError::DatabaseQuery(_) => "QUERY_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DriverLoad(_) | AppError::DatabaseConnection(_) | AppError::DatabaseQuery(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
        }
        let body = ApiResponse::err(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
