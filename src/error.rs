use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every way an auth operation can fail.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("email not registered")]
    UnknownEmail,
    #[error("incorrect password")]
    InvalidPassword,
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("session references a missing user")]
    OrphanedSession,
    #[error("infrastructure failure: {0:#}")]
    Infrastructure(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::UnknownEmail => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::OrphanedSession | AuthError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable kind, distinct per variant.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "invalid_input",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::UnknownEmail => "unknown_email",
            AuthError::InvalidPassword => "invalid_password",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::OrphanedSession => "orphaned_session",
            AuthError::Infrastructure(_) => "internal",
        }
    }

    /// Message safe to hand to an untrusted caller.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Infrastructure(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Infrastructure(ref e) = self {
            error!(error = %format!("{e:#}"), "request failed on infrastructure");
        }
        let status = self.status_code();
        let body = json!({
            "error": self.public_message(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}
