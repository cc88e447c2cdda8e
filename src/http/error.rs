//! Application errors surfaced through the error envelope.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::envelope::{build_error, ErrorEnvelope, ErrorOptions};
use crate::http::status::StatusKey;

/// Message sent to clients in place of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors raised by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Status { status: StatusKey, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusKey {
        match self {
            ApiError::NotFound(_) => StatusKey::NotFound,
            ApiError::Conflict(_) => StatusKey::Conflict,
            ApiError::BadRequest(_) => StatusKey::BadRequest,
            ApiError::Status { status, .. } => *status,
            ApiError::Internal(_) => StatusKey::InternalServerError,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_))
    }

    /// Message safe to show to clients.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Debug rendering of the error chain, for the `stack` diagnostic field.
    pub fn diagnostics(&self) -> String {
        match self {
            ApiError::Internal(e) => format!("{:?}", e),
            other => format!("{:?}", other),
        }
    }

    pub fn into_envelope(self, options: ErrorOptions) -> ErrorEnvelope {
        build_error(self.status(), self.public_message(), options)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!(error = ?e, "Unhandled internal error");
        }
        self.into_envelope(ErrorOptions::new()).into_response()
    }
}
