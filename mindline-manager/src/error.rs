//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mindline_core::Error;
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::error;

use crate::users::is_unique_violation;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";
pub const DUPLICATE_EMAIL: &str = "Email already exists. Please use another email or log in.";

/// Error returned by request handlers, rendered as `{"error": ...}`
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            ApiError::Core(Error::Conflict(DUPLICATE_EMAIL.to_string()))
        } else {
            ApiError::Database(err)
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::Unauthenticated) | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Core(Error::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Core(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
