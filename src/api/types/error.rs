//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    /// Stable machine-readable code, e.g. "already_member"
    pub code: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    code: code.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication_error", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidId { message } => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_id", message)
            }
            DomainError::Credential { message } => Self::unauthorized(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::AlreadyMember { message } => {
                Self::new(StatusCode::CONFLICT, "already_member", message)
            }
            DomainError::AlreadyProcessed { message } => {
                Self::new(StatusCode::CONFLICT, "already_processed", message)
            }
            DomainError::Expired { message } => Self::new(StatusCode::GONE, "expired", message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Storage { message }
            | DomainError::Internal { message }
            | DomainError::Configuration { message } => {
                error!("Internal error: {}", message);
                Self::internal("Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.code, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.code, "validation_error");
        assert_eq!(err.response.error.message, "Invalid input");
    }

    #[test]
    fn test_domain_error_mapping() {
        let cases: Vec<(DomainError, StatusCode, &str)> = vec![
            (DomainError::not_found("x"), StatusCode::NOT_FOUND, "not_found"),
            (
                DomainError::validation("x"),
                StatusCode::BAD_REQUEST,
                "validation_error",
            ),
            (
                DomainError::credential("x"),
                StatusCode::UNAUTHORIZED,
                "authentication_error",
            ),
            (DomainError::conflict("x"), StatusCode::CONFLICT, "conflict"),
            (
                DomainError::already_member("x"),
                StatusCode::CONFLICT,
                "already_member",
            ),
            (
                DomainError::already_processed("x"),
                StatusCode::CONFLICT,
                "already_processed",
            ),
            (DomainError::expired("x"), StatusCode::GONE, "expired"),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN, "forbidden"),
        ];

        for (domain_err, status, code) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.response.error.code, code);
        }
    }

    #[test]
    fn test_storage_errors_are_not_leaked() {
        let api_err: ApiError = DomainError::storage("connection string with password").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.response.error.message, "Internal server error");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unauthorized("Invalid token");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("authentication_error"));
        assert!(json.contains("Invalid token"));
    }
}
