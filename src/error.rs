//! Error taxonomy shared by the ledger, the request state machine and the
//! HTTP layer.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::model::leave_request::{LeaveAction, LeaveStatus};

pub type LeaveResult<T> = Result<T, LeaveError>;

#[derive(Debug, Error)]
pub enum LeaveError {
    /// Malformed input, rejected before any state change.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The actor is not allowed to perform this transition.
    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Cannot {action} a request in status {status}")]
    InvalidTransition {
        status: LeaveStatus,
        action: LeaveAction,
    },

    #[error("Insufficient leave balance. Available: {available} days, Requested: {requested} days")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    /// A concurrent writer got there first; the caller may retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Adjustment of {delta} days would leave a negative entitlement (current {current})")]
    NegativeResult { current: Decimal, delta: Decimal },

    #[error("Database error: {0}")]
    Database(String),
}

impl LeaveError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidTransition { .. } => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) | Self::AlreadyExists(_) => 409,
            Self::InsufficientBalance { .. } | Self::NegativeResult { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Conflict(_) => "CONFLICT",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::NegativeResult { .. } => "NEGATIVE_RESULT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sqlx::Error> for LeaveError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return LeaveError::AlreadyExists(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return LeaveError::NotFound("Referenced record does not exist".into());
            }
        }
        LeaveError::Database(e.to_string())
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(LeaveError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        // internal details stay in the log
        let message = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(ResponseError::status_code(self)).json(json!({
            "error": self.error_code(),
            "message": message,
        }))
    }
}
