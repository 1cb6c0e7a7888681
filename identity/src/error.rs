//! Authentication / authorization rejections shared by the edge and the services.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::token::VerifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header with a bearer token is required")]
    MissingToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    ExpiredToken,
    #[error("token is malformed or carries invalid claims")]
    MalformedClaims,
    #[error("missing gateway authentication headers")]
    MissingIdentityHeaders,
    #[error("role is not allowed to perform this operation")]
    ForbiddenRole,
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: String,
    reason: &'static str,
}

impl AuthError {
    /// Stable machine-readable reason clients can branch on.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing-token",
            AuthError::InvalidSignature => "invalid-signature",
            AuthError::ExpiredToken => "expired",
            AuthError::MalformedClaims => "malformed-claims",
            AuthError::MissingIdentityHeaders => "missing-identity-headers",
            AuthError::ForbiddenRole => "forbidden-role",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ForbiddenRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Malformed => AuthError::MalformedClaims,
            VerifyError::InvalidSignature => AuthError::InvalidSignature,
            VerifyError::Expired => AuthError::ExpiredToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponseBody {
            error: self.to_string(),
            reason: self.reason(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_token_is_401_with_reason() {
        let (status, body) = body_of(AuthError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "missing-token");
        assert!(body["error"].as_str().unwrap().contains("bearer"));
    }

    #[tokio::test]
    async fn forbidden_role_is_403() {
        let (status, body) = body_of(AuthError::ForbiddenRole).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "forbidden-role");
    }

    #[test]
    fn verify_errors_map_to_distinct_reasons() {
        assert_eq!(AuthError::from(VerifyError::Expired).reason(), "expired");
        assert_eq!(
            AuthError::from(VerifyError::InvalidSignature).reason(),
            "invalid-signature"
        );
        assert_eq!(
            AuthError::from(VerifyError::Malformed).reason(),
            "malformed-claims"
        );
    }
}
