//! Error handling for the godown inventory server
//!
//! Every failure leaves a handler as `{"error": {"code", "message", "field"?}}`

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::LedgerRejection;
use thiserror::Error;

/// Postgres SQLSTATE for "relation does not exist"
const UNDEFINED_TABLE: &str = "42P01";

/// Postgres SQLSTATE for a foreign key still referenced on delete
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid payload: {message}")]
    InvalidPayload {
        field: Option<String>,
        message: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Stock movement would result in negative stock ({balance}) on {date}")]
    NegativeStock { date: NaiveDate, balance: Decimal },

    #[error("Resource in use: {0}")]
    InUse(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Payload error tied to one input field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidPayload {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidPayload { .. } | AppError::NegativeStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InUse(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<LedgerRejection> for AppError {
    fn from(rejection: LedgerRejection) -> Self {
        match rejection {
            LedgerRejection::NegativeStock { date, balance } => {
                AppError::NegativeStock { date, balance }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidPayload {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidPayload {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field; the rest follow once it is fixed
        let first = errors.field_errors().into_iter().next();
        match first {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::invalid(field, message)
            }
            None => AppError::InvalidPayload {
                field: None,
                message: errors.to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_detail = match &self {
            AppError::Unauthenticated(msg) => ErrorDetail::new("UNAUTHENTICATED", msg.clone()),
            AppError::InvalidPayload { field, message } => ErrorDetail {
                code: "INVALID_PAYLOAD".to_string(),
                message: message.clone(),
                field: field.clone(),
            },
            AppError::NotFound(resource) => {
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::NegativeStock { date, balance } => ErrorDetail::new(
                "NEGATIVE_STOCK",
                format!(
                    "Stock movement would result in negative stock ({}) on {}",
                    balance, date
                ),
            ),
            AppError::InUse(resource) => ErrorDetail::new(
                "IN_USE",
                format!("{} is still referenced by other records", resource),
            ),
            AppError::DatabaseError(_) => {
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred")
            }
            AppError::Internal(msg) => ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (self.status_code(), Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// True when the datastore reports that a queried table does not exist yet
pub fn is_missing_table(err: &sqlx::Error) -> bool {
    database_code(err).as_deref() == Some(UNDEFINED_TABLE)
}

fn database_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Read-path fallback: a missing table yields an empty list instead of a 500
pub fn empty_if_missing<T>(result: Result<Vec<T>, sqlx::Error>, table: &str) -> AppResult<Vec<T>> {
    match result {
        Ok(rows) => Ok(rows),
        Err(err) if is_missing_table(&err) => {
            tracing::warn!("Table {} is missing, returning no rows", table);
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Map a delete blocked by a foreign key onto `InUse`
pub fn in_use_on_reference(err: sqlx::Error, resource: &str) -> AppError {
    if database_code(&err).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        AppError::InUse(resource.to_string())
    } else {
        AppError::DatabaseError(err)
    }
}
