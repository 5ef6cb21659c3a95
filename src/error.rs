use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{bot::api::BotApiError, dao::storage::StorageError};

/// Errors that can occur in service layer and admin-flow operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Content store backend is unavailable.
    #[error("content store unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without a content store.
    #[error("content store unavailable (degraded mode)")]
    Degraded,
    /// The Telegram transport rejected or failed a call.
    #[error("telegram api failure")]
    Telegram(#[source] BotApiError),
    /// Invalid input provided by the operator.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<BotApiError> for ServiceError {
    fn from(err: BotApiError) -> Self {
        ServiceError::Telegram(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
///
/// Player-facing content routes never construct these; content failures
/// degrade to benign bodies. Only the webhook boundary uses them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unauthorized access attempt (bad or missing webhook secret).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
