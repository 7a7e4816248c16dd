//! HTTP error type with IntoResponse
//!
//! Errors are rendered as a small HTML page with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use coursectl_core::StoreError;

use super::views;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed form input (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: i64 },

    /// Uniqueness or reference rule broken (409)
    Conflict { message: String },

    /// Storage failure (500, logged)
    Database { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::BadRequest { message } => message.clone(),
            Self::NotFound { resource, id } => format!("{} '{}' not found", resource, id),
            Self::Conflict { message } => message.clone(),
            Self::Database { message } => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", message);
                "an internal error occurred".to_string()
            }
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::ConstraintViolation(message) => Self::Conflict { message },
            StoreError::Backend(message) => Self::Database { message },
        }
    }
}
