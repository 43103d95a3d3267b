/// Error types for insta-service
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Postgres SQLSTATE for unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres SQLSTATE for string_data_right_truncation
const PG_STRING_TOO_LONG: &str = "22001";
/// Postgres SQLSTATE for check_violation
const PG_CHECK_VIOLATION: &str = "23514";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Media store error: {0}")]
    Media(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Translate constraint violations raised by Postgres into domain errors.
    ///
    /// `what` names the entity the statement touched and ends up in the message.
    pub fn from_db(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => {
                    return ServiceError::Conflict(format!("{} already exists", what))
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return ServiceError::NotFound(format!("{} references a missing row", what))
                }
                Some(PG_STRING_TOO_LONG) => {
                    return ServiceError::InvalidInput(format!("{} value too long", what))
                }
                Some(PG_CHECK_VIOLATION) => {
                    return ServiceError::InvalidInput(format!("{} violates a constraint", what))
                }
                _ => {}
            }
        }
        ServiceError::Database(err)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Database(_)
            | ServiceError::Media(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Store and media failures are logged server side; clients get a generic message.
        let error_msg = match self {
            ServiceError::Database(_) | ServiceError::Media(_) | ServiceError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
