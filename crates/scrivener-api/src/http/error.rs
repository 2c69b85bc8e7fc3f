//! Application error type mapping to HTTP status codes and the envelope
//! format.

use axum::response::{IntoResponse, Response};

use scrivener_core::coordinator::CoordinatorClosed;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The coordinator task is gone (shutdown in progress).
    Unavailable,
    /// Malformed request content.
    Validation(String),
}

impl From<CoordinatorClosed> for AppError {
    fn from(_: CoordinatorClosed) -> Self {
        AppError::Unavailable
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unavailable => ApiResponse::error(
                "SERVICE_UNAVAILABLE",
                "The service is shutting down and cannot accept actions",
            )
            .into_response(),
            AppError::Validation(message) => {
                ApiResponse::error("VALIDATION_ERROR", &message).into_response()
            }
        }
    }
}
