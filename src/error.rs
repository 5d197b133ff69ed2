use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

use crate::academics::{RuleViolation, TermParseError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Rule(#[from] RuleViolation),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    InternalServerError,
}

/// Constraint failures are classified by kind so callers get a typed
/// answer instead of having to inspect driver messages.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let constraint = match &err {
            sqlx::Error::RowNotFound => return AppError::NotFound,
            sqlx::Error::Database(db_err) => Some((db_err.kind(), db_err.message().to_string())),
            _ => None,
        };

        match constraint {
            Some((ErrorKind::UniqueViolation, _)) => {
                AppError::Conflict("a record with the same unique key already exists".to_string())
            }
            Some((ErrorKind::ForeignKeyViolation, _)) => AppError::Conflict(
                "the record references, or is referenced by, another record".to_string(),
            ),
            Some((ErrorKind::NotNullViolation | ErrorKind::CheckViolation, message)) => {
                AppError::BadRequest(message)
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<TermParseError> for AppError {
    fn from(err: TermParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.to_string()),
            AppError::Rule(violation @ RuleViolation::DuplicateEnrollment { .. }) => {
                (StatusCode::CONFLICT, violation.to_string())
            }
            AppError::Rule(violation) => (StatusCode::UNPROCESSABLE_ENTITY, violation.to_string()),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Config(_) | AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
