use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// --- Collaborator Errors ---

/// RepoError
///
/// Failure raised by the persistence layer. The message is the driver's own text and is
/// surfaced verbatim by the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepoError {
    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// StorageError
///
/// Object store failures. `NotFound` covers missing objects and missing buckets.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Unavailable(String),
}

/// EmailError
///
/// Failures of the transactional email provider.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmailError {
    // The provider answered, but refused the message.
    #[error("Email provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    // The provider could not be reached or answered garbage.
    #[error("{0}")]
    Transport(String),
}

// --- HTTP Boundary Errors ---

/// AppError
///
/// The error taxonomy of the HTTP boundary. Every handler returns `Result<_, AppError>`
/// for read endpoints; the response body is `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidUrl(msg) => AppError::BadRequest(msg),
            StorageError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::Internal(err.to_string())
    }
}

// Extractor rejections are input errors: the body or query string did not parse.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// ActionError
///
/// Envelope used by write endpoints: `{"success": false, "error": "<message>"}` with the
/// status of the wrapped `AppError`.
#[derive(Debug)]
pub struct ActionError(pub AppError);

impl From<AppError> for ActionError {
    fn from(err: AppError) -> Self {
        ActionError(err)
    }
}

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        ActionError(rejection.into())
    }
}

impl From<RepoError> for ActionError {
    fn from(err: RepoError) -> Self {
        ActionError(err.into())
    }
}

impl From<EmailError> for ActionError {
    fn from(err: EmailError) -> Self {
        ActionError(err.into())
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        (
            status,
            Json(json!({ "success": false, "error": self.0.to_string() })),
        )
            .into_response()
    }
}
