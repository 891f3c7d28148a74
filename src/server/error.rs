//! JSON error responses for the HTTP API.

use crate::server::middleware::RATE_LIMIT_MESSAGE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    TooManyRequests,
    NotFound { message: String, path: String, method: String },
    /// `details` is only filled in development.
    Internal { details: Option<String> },
}

impl ApiError {
    /// Log the underlying error; expose its message only when `development`.
    pub fn internal(err: anyhow::Error, development: bool) -> Self {
        error!("Server error: {:#}", err);
        Self::Internal {
            details: development.then(|| format!("{:#}", err)),
        }
    }

    pub fn not_found(message: impl Into<String>, method: &Method, uri: &Uri) -> Self {
        Self::NotFound {
            message: message.into(),
            path: uri.path().to_string(),
            method: method.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": message })),
            )
                .into_response(),
            Self::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "status": "error", "message": RATE_LIMIT_MESSAGE })),
            )
                .into_response(),
            Self::NotFound {
                message,
                path,
                method,
            } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "status": "error",
                    "message": message,
                    "path": path,
                    "method": method,
                })),
            )
                .into_response(),
            Self::Internal { details } => {
                let mut body = json!({
                    "status": "error",
                    "message": "Internal server error occurred",
                });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found("Resource not found", &method, &uri)
}
