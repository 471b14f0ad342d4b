use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Machine-readable codes carried in every error body. The console keys
/// its alerts off these; messages are shown as-is.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const TOO_MANY_REQUESTS: &str = "TOO_MANY_REQUESTS";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Error returned by front-desk services and rendered by the HTTP layer as
/// `{"code": ..., "message": ...}`. Display is the bare message.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key, or a value that may only be written once.
    #[error("{0}")]
    Conflict(String),

    /// Bad input, or a state transition the record does not allow.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Signed in, but not allowed (customer tokens, staff-only deletes).
    #[error("{0}")]
    PermissionDenied(String),

    /// Sign-in locked after repeated failures.
    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use error_code::*;
        match self {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, NOT_FOUND),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, ALREADY_EXISTS),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, VALIDATION_FAILED),
            ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, UNAUTHENTICATED),
            ServiceError::PermissionDenied(_) => (StatusCode::FORBIDDEN, PERMISSION_DENIED),
            ServiceError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS),
            ServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, STORAGE_ERROR),
            ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL),
        }
    }

    pub fn error_code(&self) -> &'static str {
        self.parts().1
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = serde_json::json!({
            "code": code,
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
