//! API error types and responses.
//!
//! Failures are rendered as `{ "status": "fail" | "error", "message": ... }`:
//! `fail` for client errors, `error` for server-side failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use promptpix_core::LedgerError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Insufficient credits at gate time or on a direct debit.
    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits {
        /// Required amount.
        required: i64,
        /// Current balance.
        available: i64,
    },

    /// Settlement found an overdraft and rolled the charge back.
    #[error("Insufficient credits, operation cancelled")]
    OperationCancelled {
        /// Required amount.
        required: i64,
        /// Balance after compensation.
        available: i64,
    },

    /// Too many requests for this account.
    #[error("Too many updates, retry in {retry_after_seconds}s")]
    RateLimited {
        /// Seconds until the next attempt is allowed.
        retry_after_seconds: u64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("{0}")]
    ExternalService(String),
}

/// JSON failure envelope.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            Self::InsufficientCredits {
                required,
                available,
            }
            | Self::OperationCancelled {
                required,
                available,
            } => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                Some(serde_json::json!({
                    "required": required,
                    "available": available
                })),
            ),
            Self::RateLimited {
                retry_after_seconds,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                self.to_string(),
                Some(serde_json::json!({ "retry_after_seconds": retry_after_seconds })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => {
                tracing::warn!(error = %msg, "External service error");
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
        };

        let body = ErrorResponse {
            status: if status.is_server_error() { "error" } else { "fail" },
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unauthenticated => Self::Unauthorized,
            LedgerError::AccountNotFound { .. } => Self::NotFound("Account not found".into()),
            LedgerError::InsufficientCredits {
                required,
                available,
            } => Self::InsufficientCredits {
                required,
                available,
            },
            LedgerError::OperationCancelled {
                required,
                available,
            } => Self::OperationCancelled {
                required,
                available,
            },
            LedgerError::InvalidAmount(msg) => Self::BadRequest(msg),
            LedgerError::AccountExists(_) => Self::Conflict("Account already exists".into()),
            LedgerError::InvalidId(e) => Self::BadRequest(e.to_string()),
            LedgerError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<promptpix_store::StoreError> for ApiError {
    fn from(err: promptpix_store::StoreError) -> Self {
        LedgerError::from(err).into()
    }
}

impl From<crate::imaging::ImagingError> for ApiError {
    fn from(err: crate::imaging::ImagingError) -> Self {
        Self::ExternalService(format!("Image operation failed: {err}"))
    }
}
