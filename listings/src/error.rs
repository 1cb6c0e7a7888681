use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity::AuthError;
use serde::Serialize;
use thiserror::Error;

use crate::repos::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("listing not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: String,
    reason: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            AppError::Auth(e) => return (*e).into_response(),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid-request"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not-found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let body = ErrorResponseBody {
            error: self.to_string(),
            reason,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => AppError::NotFound,
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            other => {
                tracing::error!(error = %other, "listing store failed");
                AppError::Internal
            }
        }
    }
}
