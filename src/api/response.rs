//! Response types for the workforce API.
//!
//! Every failure is returned as `{success: false, code, message, details?}`
//! with a status matching the [`EngineError`] variant.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 401 for requests without usable identity headers.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHENTICATED", message),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("INTERNAL_ERROR", "An unexpected error occurred"),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::PasswordHashError { .. }
            | EngineError::Internal { .. }
            | EngineError::CalculationError { .. } => return Self::internal(),
            EngineError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            EngineError::SalaryProfileNotFound { .. } => {
                (StatusCode::NOT_FOUND, "SALARY_PROFILE_NOT_FOUND")
            }
            EngineError::RecordNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            EngineError::DuplicateRecord { .. } => (StatusCode::CONFLICT, "DUPLICATE_RECORD"),
            EngineError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            EngineError::RecordLocked { .. } => (StatusCode::CONFLICT, "RECORD_LOCKED"),
            EngineError::ConcurrencyConflict { .. } => {
                return Self {
                    status: StatusCode::CONFLICT,
                    error: ApiError::new(
                        "CONCURRENCY_CONFLICT",
                        "The record was changed by someone else, please retry",
                    ),
                };
            }
            EngineError::ExamFrozen { .. } => (StatusCode::CONFLICT, "EXAM_FROZEN"),
            EngineError::InsufficientQuantity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_QUANTITY")
            }
            EngineError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            EngineError::MissingColumn { .. } => (StatusCode::BAD_REQUEST, "MISSING_COLUMN"),
            EngineError::UnreadableImport { .. } => (StatusCode::BAD_REQUEST, "UNREADABLE_IMPORT"),
            EngineError::AccountLocked { retry_after_secs, .. } => {
                return Self {
                    status: StatusCode::LOCKED,
                    error: ApiError::with_details(
                        "ACCOUNT_LOCKED",
                        "Too many failed login attempts",
                        format!("retry after {} seconds", retry_after_secs),
                    ),
                };
            }
            EngineError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            EngineError::PermissionDenied { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };

        Self {
            status,
            error: ApiError::new(code, message),
        }
    }
}
