// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every failure surfaces to clients as a JSON body with a single
//! `error_message` key and an appropriate HTTP status. Internal detail
//! (database errors, unexpected failures) is logged but never leaked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("token has expired")]
    TokenExpired,

    #[error("malformed token")]
    TokenMalformed,

    #[error("invalid token")]
    TokenInvalid,

    /// Login failure. Deliberately generic: never says whether the email
    /// or the password was wrong.
    #[error("invalid email or password")]
    AuthenticationFailed,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("user does not exist: {0}")]
    UserNotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body. The `error_message` key is a wire contract
/// consumed by the mobile and web clients.
#[derive(Serialize)]
struct ErrorResponse {
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized
            | AppError::TokenExpired
            | AppError::TokenMalformed
            | AppError::TokenInvalid
            | AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // 500s get a generic message; everything else uses the Display text.
        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error_message })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
