use std::backtrace::Backtrace;

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A session (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// A password hashing error.
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// No matching record was found.
    #[error("Resource not found")]
    NotFound,

    /// The email/password pair did not match a user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The email address is already registered.
    #[error("Duplicate email")]
    DuplicateEmail,

    /// The CSRF token was missing or did not match the session secret.
    #[error("CSRF token missing or invalid")]
    Csrf,

    /// A malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The submitted form could not be decoded.
    #[error("Form decode error: {0}")]
    FormDecode(#[from] FormRejection),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Csrf | AppError::BadRequest(_) | AppError::FormDecode(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let trace = Backtrace::force_capture();
            tracing::error!("{}\n{}", self, trace);
        } else if status == StatusCode::NOT_FOUND {
            tracing::debug!("Resource not found");
        } else {
            tracing::warn!("Client error ({}): {}", status, self);
        }

        let message = status.canonical_reason().unwrap_or("Error");

        (status, message).into_response()
    }
}
