use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
///
/// Each variant's display string is exactly the message sent to the client in
/// the `{"error": "..."}` body. Persistence failures carry a generic message;
/// the underlying error is logged and recorded on the span, never exposed.
#[derive(Debug, Error)]
pub enum AppError {
    /// Path identifier did not parse as an integer
    #[error("Invalid task ID")]
    InvalidId,
    /// Request body was not valid JSON
    #[error("Invalid request payload")]
    InvalidPayload,
    /// Missing or empty title on create/update
    #[error("Title is required")]
    TitleRequired,
    /// Operation targeted a nonexistent task
    #[error("Task not found")]
    NotFound,
    /// Opaque persistence failure, surfaced with a per-operation generic message
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        Self::Storage { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidId | Self::InvalidPayload | Self::TitleRequired => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage { message, source } => {
                tracing::error!(error = %source, "{}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
