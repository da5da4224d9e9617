use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The taxonomy mirrors the service contract: validation and identity errors
/// reject a request before any upstream call; quota/cooldown reject a whole
/// search up front; rate-limit and upstream errors describe a single field
/// retrieval that failed after the orchestrator gave up on it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Daily quota of {limit} searches reached")]
    QuotaExceeded { limit: u32 },

    #[error("Cooldown active: retry in {retry_after_secs}s")]
    CooldownActive { retry_after_secs: u64 },

    #[error("Upstream model rate limit persisted through all retries")]
    RateLimited,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Adapter failures surface as 429 when the model kept rate limiting and as
/// a bad gateway otherwise. Orchestrated transports report these per field
/// instead of converting; only single-call paths bubble them up whole.
impl From<LlmError> for AppError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::RateLimited => AppError::RateLimited,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::QuotaExceeded { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUOTA_EXCEEDED",
                format!("Daily limit of {limit} searches reached. Try again tomorrow."),
            ),
            AppError::CooldownActive { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "COOLDOWN_ACTIVE",
                format!("Please wait {retry_after_secs}s before searching again."),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "The model API is rate limiting requests. Try again shortly.".to_string(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The model API returned an error".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Cooldown rejections also advertise the wait via Retry-After.
        if let AppError::CooldownActive { retry_after_secs } = self {
            return (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}
