//! Error types for Bookshelf.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system. Every error renders as a JSON body:
//! `{"detail": "..."}` or, for validation failures, a field-keyed map.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Field name to human-readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Invalid token.")]
    InvalidToken,

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Validation errors
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("JSON parse error - {0}")]
    ParseError(String),

    // External service errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // 403
            Self::AuthenticationRequired | Self::PermissionDenied | Self::InvalidToken => {
                StatusCode::FORBIDDEN
            }

            // 404
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 409
            Self::AlreadyExists(_) => StatusCode::CONFLICT,

            // 400
            Self::Validation(_) | Self::ParseError(_) => StatusCode::BAD_REQUEST,

            // 500
            Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            Self::Validation(errors) => json!(errors),
            ref err if status.is_server_error() => {
                tracing::error!(error = %err, "Request failed");
                json!({ "detail": "A server error occurred." })
            }
            err => json!({ "detail": err.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_errors_render_detail() {
        let response = Error::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Authentication credentials were not provided."})
        );

        let response = Error::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "You do not have permission to perform this action."})
        );
    }

    #[tokio::test]
    async fn test_validation_renders_field_map() {
        let response = Error::field("name", "This field is required.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"name": ["This field is required."]})
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_internals() {
        let response = Error::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "A server error occurred."})
        );
    }
}
