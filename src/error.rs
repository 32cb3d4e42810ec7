//! Application error type and its HTTP representation.
//!
//! Every failure the service can surface is an [`AppError`] variant. The
//! variant decides the status code and the stable `code` string clients can
//! branch on; internal details are logged and never sent to the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Error codes exposed in the `code` field of error responses.
pub mod codes {
    pub const ERR_INVALID_ALIAS: &str = "ERR_INVALID_ALIAS";
    pub const ERR_ALIAS_TAKEN: &str = "ERR_ALIAS_TAKEN";
    pub const ERR_INVALID_URL: &str = "ERR_INVALID_URL";
    pub const ERR_INVALID_REQUEST: &str = "ERR_INVALID_REQUEST";
    pub const ERR_NOT_FOUND: &str = "ERR_NOT_FOUND";
    pub const ERR_RATE_LIMIT_EXCEEDED: &str = "ERR_RATE_LIMIT_EXCEEDED";
    pub const ERR_REQUEST_TIMEOUT: &str = "ERR_REQUEST_TIMEOUT";
    pub const ERR_INTERNAL_SERVER_ERROR: &str = "ERR_INTERNAL_SERVER_ERROR";
}

const GENERIC_MESSAGE: &str = "An unexpected error occurred.";

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidAlias(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    AliasTaken(String),

    /// Unique index violation on `short_key`. Services translate it; it only
    /// reaches the client as a last resort.
    #[error("Short key already exists: {0}")]
    DuplicateKey(String),

    #[error("Unable to generate unique short key after {attempts} attempts")]
    AllocationFailed { attempts: usize },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("{0}")]
    NotFound(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u128),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) | Self::InvalidAlias(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::AliasTaken(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::DuplicateKey(_)
            | Self::AllocationFailed { .. }
            | Self::Storage(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => codes::ERR_INVALID_URL,
            Self::InvalidAlias(_) => codes::ERR_INVALID_ALIAS,
            Self::InvalidRequest(_) => codes::ERR_INVALID_REQUEST,
            Self::AliasTaken(_) => codes::ERR_ALIAS_TAKEN,
            Self::RateLimited => codes::ERR_RATE_LIMIT_EXCEEDED,
            Self::NotFound(_) => codes::ERR_NOT_FOUND,
            Self::Timeout(_) => codes::ERR_REQUEST_TIMEOUT,
            Self::DuplicateKey(_)
            | Self::AllocationFailed { .. }
            | Self::Storage(_)
            | Self::Internal(_) => codes::ERR_INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    ///
    /// Server-side failures collapse to a generic sentence so that storage
    /// details and key names never leak.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            GENERIC_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        let status = self.status();
        ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: self.public_message(),
            code: self.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "Request rejected");
        }

        (status, Json(self.to_error_body())).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidRequest(errors.to_string())
    }
}
