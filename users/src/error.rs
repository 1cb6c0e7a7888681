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
        tracing::error!(error = %e, "profile store failed");
        AppError::Internal
    }
}
