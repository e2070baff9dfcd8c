//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::idempotency::IdempotencyError;
use crate::repository::StorageError;

/// Generic message for 5xx responses; details go to the log only
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No limit row for the `(customer, tenor)` pair, or the lock failed
    #[error("Invalid tenor or credit limit")]
    InvalidTenorOrCreditLimit,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("NIK already registered")]
    NikAlreadyRegistered,

    #[error("Idempotency conflict: same key with different request")]
    IdempotencyConflict,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<IdempotencyError> for AppError {
    fn from(err: IdempotencyError) -> Self {
        match err {
            IdempotencyError::HashMismatch(_) | IdempotencyError::ConcurrentDuplicate(_) => {
                AppError::IdempotencyConflict
            }
            IdempotencyError::Database(e) => AppError::Database(e),
        }
    }
}

// Extractor rejections answer with the same JSON body as every other error
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    pub fn error_code(&self) -> &'static str {
        self.classify().1
    }

    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::InvalidTenorOrCreditLimit => {
                (StatusCode::BAD_REQUEST, "invalid_tenor_or_credit_limit")
            }
            AppError::Domain(domain_err) => match domain_err {
                DomainError::PriceExceedsLimit { .. } => {
                    (StatusCode::BAD_REQUEST, "price_exceeds_credit_limit")
                }
                DomainError::InvalidTenor(_)
                | DomainError::InvalidAmount(_)
                | DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
            },

            // 401 Unauthorized
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),

            // 404 Not Found
            AppError::TransactionNotFound => (StatusCode::NOT_FOUND, "transaction_not_found"),
            AppError::CustomerNotFound => (StatusCode::NOT_FOUND, "customer_not_found"),

            // 409 Conflict
            AppError::EmailAlreadyRegistered => (StatusCode::CONFLICT, "email_already_registered"),
            AppError::NikAlreadyRegistered => (StatusCode::CONFLICT, "nik_already_registered"),
            AppError::IdempotencyConflict => (StatusCode::CONFLICT, "idempotency_conflict"),

            // 422 Unprocessable Entity
            AppError::InvalidCredentials => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_credentials")
            }

            // 500 Internal Server Error
            AppError::Storage(_) | AppError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            AppError::Internal(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.classify();

        let (error, details) = if status.is_server_error() {
            tracing::error!(error_code, "{:?}", self);
            (INTERNAL_MESSAGE.to_string(), None)
        } else {
            let details = match &self {
                AppError::Domain(DomainError::PriceExceedsLimit { price, limit }) => {
                    Some(format!("price {}, limit {}", price, limit))
                }
                _ => None,
            };
            (self.to_string(), details)
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
