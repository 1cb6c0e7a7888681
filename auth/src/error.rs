use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity::AuthError;
use serde::Serialize;
use thiserror::Error;

use crate::services::account_service::AccountError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not found")]
    NotFound,

    #[error("email is already registered")]
    Conflict,

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
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid-credentials"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not-found"),
            AppError::Conflict => (StatusCode::CONFLICT, "conflict"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let body = ErrorResponseBody {
            error: self.to_string(),
            reason,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Invalid(msg) => AppError::InvalidRequest(msg.to_string()),
            AccountError::EmailTaken => AppError::Conflict,
            AccountError::InvalidCredentials => AppError::InvalidCredentials,
            AccountError::NotFound => AppError::NotFound,
            other => {
                tracing::error!(error = %other, "account operation failed");
                AppError::Internal
            }
        }
    }
}
