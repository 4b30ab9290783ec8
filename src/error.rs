//! Error types for the Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable application error codes surfaced in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    Duplicate = 5,
    RecordInUse = 6,
    BadValue = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Delete restricted: {0}")]
    Restrict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Translate storage-layer constraint violations into domain errors so the
/// DDL constraints (unique indexes, FK RESTRICT, CHECK) surface as 4xx
/// responses instead of opaque database failures.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            let constraint = db.constraint().map(str::to_owned);
            match db.code().as_deref() {
                // unique_violation
                Some("23505") => {
                    return match constraint.as_deref() {
                        Some("genres_name_ci_unique") => AppError::Conflict(
                            "Genre already exists (case insensitive match)".to_string(),
                        ),
                        Some("books_isbn_unique") => AppError::Conflict(
                            "A book with this ISBN already exists".to_string(),
                        ),
                        Some(name) => AppError::Conflict(format!(
                            "Duplicate value violates unique constraint {name}"
                        )),
                        None => AppError::Conflict("Duplicate value".to_string()),
                    };
                }
                // foreign_key_violation: RESTRICT on a referenced row
                Some("23503") => {
                    return match constraint.as_deref() {
                        Some("books_author_id_fkey") => AppError::Restrict(
                            "Author is still referenced by at least one book".to_string(),
                        ),
                        Some("book_genres_genre_id_fkey") => AppError::Restrict(
                            "Genre is still referenced by at least one book".to_string(),
                        ),
                        Some("book_instances_book_id_fkey") => AppError::Restrict(
                            "Book is still referenced by at least one book instance".to_string(),
                        ),
                        // borrower FK is SET NULL on delete, so this only
                        // fires on writes naming a missing patron
                        Some("book_instances_borrower_id_fkey") => AppError::Validation(
                            "Borrower does not exist".to_string(),
                        ),
                        Some(name) => AppError::Restrict(format!(
                            "Record is still referenced (constraint {name})"
                        )),
                        None => AppError::Restrict("Record is still referenced".to_string()),
                    };
                }
                // check_violation: only the status CHECK exists in the schema
                Some("23514") => {
                    return AppError::Validation(format!(
                        "Value rejected by constraint {}",
                        constraint.as_deref().unwrap_or("unknown")
                    ));
                }
                _ => {}
            }
        }
        AppError::Database(e)
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Restrict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::RecordInUse, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
