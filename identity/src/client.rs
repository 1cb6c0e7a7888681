//! Service-to-service calls on behalf of an already verified caller.
//!
//! The callee sees the same identity headers the edge would have injected and
//! runs its own guard on them. Calls are bounded by a timeout and never
//! retried. Callers decide what a failure means; for profile provisioning it
//! is logged and the primary write stands.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::headers::{X_REQUEST_ID, X_USER_ID, X_USER_ROLE};
use crate::role::Role;
use crate::visibility::Visibility;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("invalid target url: {0}")]
    InvalidTarget(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream responded with {0}")]
    Status(StatusCode),
}

/// An operation on another service, with the visibility that service declares for it.
#[derive(Debug, Clone)]
pub struct TargetOperation {
    pub method: Method,
    pub path: &'static str,
    pub visibility: Visibility,
}

impl TargetOperation {
    pub const fn new(method: Method, path: &'static str, visibility: Visibility) -> Self {
        Self {
            method,
            path,
            visibility,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IdentityClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, PropagationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PropagationError::Client)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Call `op` as `user_id`.
    ///
    /// The role header is sent only when the target requires an identity.
    /// The correlation id of the originating request is forwarded, or a new one
    /// is generated when there is none.
    pub async fn call_with_identity<T>(
        &self,
        op: &TargetOperation,
        user_id: i64,
        role: Role,
        correlation_id: Option<&str>,
        payload: &T,
    ) -> Result<(), PropagationError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.base_url.join(op.path)?;
        let request_id = correlation_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut request = self
            .http
            .request(op.method.clone(), url)
            .header(X_USER_ID, user_id.to_string())
            .header(X_REQUEST_ID, request_id.as_str())
            .json(payload);

        if op.visibility.requires_identity() {
            request = request.header(X_USER_ROLE, role.as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!(user_id, path = op.path, request_id = %request_id, error = %e, "identity propagation failed");
            PropagationError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(user_id, path = op.path, request_id = %request_id, %status, "identity propagation rejected");
            return Err(PropagationError::Status(status));
        }

        info!(user_id, path = op.path, request_id = %request_id, "identity propagated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::HeaderMap, routing::post};

    type Seen = Arc<Mutex<Vec<HeaderMap>>>;

    async fn spawn_callee(status: StatusCode) -> (Url, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();

        let app = Router::new().route(
            "/users/profile",
            post(move |headers: HeaderMap| {
                let captured = captured.clone();
                async move {
                    captured.lock().unwrap().push(headers);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), seen)
    }

    const PROTECTED: TargetOperation =
        TargetOperation::new(Method::POST, "/users/profile", Visibility::Protected);
    const PUBLIC: TargetOperation =
        TargetOperation::new(Method::POST, "/users/profile", Visibility::Public);

    #[tokio::test]
    async fn forwards_subject_and_role_to_protected_targets() {
        let (base, seen) = spawn_callee(StatusCode::OK).await;
        let client = IdentityClient::new(base, Duration::from_secs(2)).unwrap();

        client
            .call_with_identity(&PROTECTED, 42, Role::Customer, Some("req-7"), &serde_json::json!({}))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][X_USER_ID], "42");
        assert_eq!(seen[0][X_USER_ROLE], "CUSTOMER");
        assert_eq!(seen[0][X_REQUEST_ID], "req-7");
    }

    #[tokio::test]
    async fn omits_role_for_public_targets_and_generates_request_id() {
        let (base, seen) = spawn_callee(StatusCode::OK).await;
        let client = IdentityClient::new(base, Duration::from_secs(2)).unwrap();

        client
            .call_with_identity(&PUBLIC, 42, Role::Customer, None, &serde_json::json!({}))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].get(X_USER_ROLE).is_none());
        let generated = seen[0][X_REQUEST_ID].to_str().unwrap();
        assert!(Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _seen) = spawn_callee(StatusCode::UNAUTHORIZED).await;
        let client = IdentityClient::new(base, Duration::from_secs(2)).unwrap();

        let err = client
            .call_with_identity(&PROTECTED, 42, Role::Customer, None, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, PropagationError::Status(StatusCode::UNAUTHORIZED)));
    }

    #[tokio::test]
    async fn unreachable_callee_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let client = IdentityClient::new(base, Duration::from_secs(2)).unwrap();

        let err = client
            .call_with_identity(&PROTECTED, 42, Role::Customer, None, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, PropagationError::Transport(_)));
    }
}
