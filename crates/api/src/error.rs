use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quickform_core::error::CoreError;
use quickform_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `quickform_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A durable storage error.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The request body could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The admission controller throttled this client.
    #[error("Rate limited")]
    RateLimited,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned with every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many submissions, please try again later";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::Store(err) => {
                tracing::error!(error = %err, "Storage error");
                internal()
            }

            // Expected traffic shaping: no error-level log, flat body.
            AppError::RateLimited => {
                let body = json!({
                    "error": "rate_limit",
                    "message": RATE_LIMIT_MESSAGE,
                });
                return (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
