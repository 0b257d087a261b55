//! Handler error type
//!
//! Client errors carry their message through to the JSON body. Storage
//! errors are logged in full and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[source] crate::Error),
}

impl ServerError {
    pub fn login_required() -> Self {
        ServerError::Unauthorized("login required".to_owned())
    }
}

impl From<crate::Error> for ServerError {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::InvalidInput(m) => ServerError::BadRequest(m),
            crate::Error::NotFound(m) => ServerError::NotFound(m),
            crate::Error::DuplicateEmail(email) => {
                ServerError::Conflict(format!("User with email {email} already exists"))
            }
            other => ServerError::Database(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ServerError::login_required(), StatusCode::UNAUTHORIZED),
            (ServerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (crate::Error::InvalidInput("bad".into()).into(), StatusCode::BAD_REQUEST),
            (crate::Error::DuplicateEmail("a@b.c".into()).into(), StatusCode::CONFLICT),
            (
                crate::Error::Io(std::io::Error::other("disk")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
