/*
 * Responsibility
 * - Edge-level errors and their HTTP mapping
 * - Same body shape as identity rejections: {"error": ..., "reason": ...}
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity::AuthError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("request path cannot be normalized")]
    InvalidPath,

    #[error("no upstream serves this path")]
    NoUpstream,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("upstream service unavailable")]
    BadGateway,

    #[error("upstream service timed out")]
    GatewayTimeout,

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
            AppError::InvalidPath => (StatusCode::BAD_REQUEST, "invalid-path"),
            AppError::NoUpstream => (StatusCode::NOT_FOUND, "not-found"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload-too-large"),
            AppError::BadGateway => (StatusCode::BAD_GATEWAY, "bad-gateway"),
            AppError::GatewayTimeout => (StatusCode::GATEWAY_TIMEOUT, "gateway-timeout"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        let body = ErrorResponseBody {
            error: self.to_string(),
            reason,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn auth_errors_keep_their_status_and_reason() {
        let res = AppError::from(AuthError::ForbiddenRole).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(res).await["reason"], "forbidden-role");
    }

    #[tokio::test]
    async fn upstream_failures_map_to_gateway_statuses() {
        let res = AppError::BadGateway.into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(res).await;
        assert_eq!(body["reason"], "bad-gateway");
        assert_eq!(body["error"], "upstream service unavailable");

        assert_eq!(
            AppError::NoUpstream.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::GatewayTimeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
