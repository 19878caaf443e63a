//! Application error handling
//!
//! Converts internal errors to HTTP responses. Authentication failures map
//! to the status split the API contract requires: missing credentials 401,
//! invalid or expired token 403, locked account 423, disabled account 403.

use amlak_shared::errors::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        field: Option<String>,
    },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Conflict on a specific request field (duplicate username/phone)
    pub fn conflict_on(field: &str, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Conflict without a field (dependent-resource refusals)
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            field: None,
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

fn auth_status(err: &AuthError) -> (StatusCode, &'static str) {
    match err {
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        AuthError::AccountLocked => (StatusCode::LOCKED, "ACCOUNT_LOCKED"),
        AuthError::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AuthError::InvalidToken => (StatusCode::FORBIDDEN, "INVALID_TOKEN"),
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Auth(err) => {
                let (status, code) = auth_status(err);
                (status, code, err.to_string(), None)
            }
            ApiError::Conflict { message, field } => (
                StatusCode::CONFLICT,
                "CONFLICT",
                message.clone(),
                field.clone(),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_account_returns_423() {
        let error = ApiError::Auth(AuthError::AccountLocked);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::LOCKED);
    }

    #[test]
    fn test_missing_token_is_401_but_invalid_token_is_403() {
        let missing = ApiError::Auth(AuthError::MissingToken).into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = ApiError::Auth(AuthError::InvalidToken).into_response();
        assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_disabled_account_returns_403() {
        let error = ApiError::Auth(AuthError::AccountDisabled);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_conflict_returns_409() {
        let error = ApiError::conflict_on("username", "This username is already taken");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let error = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
