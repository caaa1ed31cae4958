//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. The
//! [`IntoResponse`] impl maps each variant to its HTTP status and the
//! `{ "error": string }` body shape the API speaks; unexpected failures are
//! logged and surfaced as a generic 500 without leaking internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed caller input; message is surfaced verbatim
    #[error("{message}")]
    Validation { message: String },

    /// Missing credential or failed login
    #[error("{message}")]
    Unauthorized { message: String },

    /// Valid credential but insufficient privilege, or a bad token signature
    #[error("{message}")]
    Forbidden { message: String },

    /// Entity lookup came up empty
    #[error("{message}")]
    NotFound { message: String },

    /// Business-rule violation: rate limits, already-processed records,
    /// minimum thresholds
    #[error("{message}")]
    Conflict { message: String },

    /// A balance check failed; message names the balance involved
    #[error("{message}")]
    InsufficientFunds { message: String },

    /// Non-positive or non-finite monetary amount
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    /// Configuration loading or parsing problem
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Password hashing/verification failure
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Token issuance failure (decode failures map to [`Error::Forbidden`]
    /// at the extraction boundary instead)
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. }
            | Error::Conflict { .. }
            | Error::InsufficientFunds { .. }
            | Error::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {self:?}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
