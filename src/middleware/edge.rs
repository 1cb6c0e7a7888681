//! Edge filter: classify, authenticate, rewrite identity headers.
//!
//! Two ordered stages, each `(request, next) -> response`:
//! 1. `classify` normalizes the path (dot segments resolved as the proxy
//!    will resolve them), runs the route table and stores the `Visibility` in request extensions
//! 2. `authenticate` verifies the bearer token as the visibility demands, then
//!    strips caller-supplied identity headers and injects the verified ones
//!
//! The correlation id is always regenerated here and echoed on the response.
//! Rejections are terminal: nothing is forwarded.

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use identity::{
    AuthError, Claims, Role, TokenCodec, Visibility,
    headers::{bearer_token, inject_identity, set_request_id, strip_identity},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::proxy::normalize_path_and_query;
use crate::state::AppState;

/// Mount both stages. `classify` must run first, so it is layered last.
pub fn apply(router: Router, state: AppState) -> Router {
    router
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state, classify))
}

async fn classify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // Classify the path the proxy will actually forward
    if req.uri().path().starts_with('/') {
        match normalized_uri(req.uri()) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(err) => {
                warn!(path = req.uri().path(), "request path rejected at edge");
                let mut res = err.into_response();
                set_request_id(res.headers_mut(), &Uuid::new_v4().to_string());
                return res;
            }
        }
    }

    let visibility = state.routes.classify(req.method(), req.uri().path());
    debug!(
        method = %req.method(),
        path = req.uri().path(),
        visibility = visibility.as_str(),
        "route classified"
    );

    req.extensions_mut().insert(visibility);
    next.run(req).await
}

fn normalized_uri(uri: &Uri) -> Result<Uri, AppError> {
    let raw = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let normalized = normalize_path_and_query(raw).map_err(|_| AppError::InvalidPath)?;
    if normalized == raw {
        return Ok(uri.clone());
    }

    debug!(raw, normalized = %normalized, "request path normalized");
    normalized.parse().map_err(|_| AppError::InvalidPath)
}

async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // A request that skipped classification is treated as protected
    let visibility = req
        .extensions()
        .get::<Visibility>()
        .copied()
        .unwrap_or(Visibility::Protected);

    let request_id = Uuid::new_v4().to_string();

    let identity = match resolve_identity(&state.codec, req.headers(), visibility) {
        Ok(identity) => identity,
        Err(err) => {
            warn!(
                method = %req.method(),
                path = req.uri().path(),
                visibility = visibility.as_str(),
                reason = err.reason(),
                request_id = %request_id,
                "request rejected at edge"
            );
            let mut res = err.into_response();
            set_request_id(res.headers_mut(), &request_id);
            return res;
        }
    };

    let headers = req.headers_mut();
    strip_identity(headers);
    if let Some((user_id, role)) = identity {
        inject_identity(headers, user_id, role);
    }
    set_request_id(headers, &request_id);

    debug!(
        user_id = identity.map(|(id, _)| id),
        request_id = %request_id,
        "forwarding request"
    );

    let mut res = next.run(req).await;
    set_request_id(res.headers_mut(), &request_id);
    res
}

/// The verified identity to inject, if any.
fn resolve_identity(
    codec: &TokenCodec,
    headers: &HeaderMap,
    visibility: Visibility,
) -> Result<Option<(i64, Role)>, AuthError> {
    match visibility {
        Visibility::Public => Ok(None),
        // Enrichment only: a bad or missing token never blocks
        Visibility::PublicOptional => Ok(bearer_token(headers)
            .and_then(|token| codec.verify(token).ok())
            .map(identity_of)),
        Visibility::Protected | Visibility::AdminOnly => {
            let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
            let claims = codec.verify(token)?;

            if let Some(required) = visibility.required_role()
                && claims.role != required
            {
                return Err(AuthError::ForbiddenRole);
            }

            Ok(Some(identity_of(claims)))
        }
    }
}

fn identity_of(claims: Claims) -> (i64, Role) {
    (claims.user_id, claims.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Upstreams;
    use crate::routes::RouteTable;
    use axum::{
        Json,
        body::{Body, to_bytes},
        http::{HeaderName, HeaderValue, Method, StatusCode},
        routing::get,
    };
    use chrono::{Duration, Utc};
    use identity::Identity;
    use identity::headers::{X_REQUEST_ID, X_USER_ID, X_USER_ROLE};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &[u8] = b"edge-test-secret-edge-test-secret!!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET).unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            codec(),
            RouteTable::standard().unwrap(),
            Upstreams::default(),
            reqwest::Client::new(),
        )
    }

    /// Stands in for the upstream: reports the headers it received.
    async fn echo(headers: HeaderMap) -> Json<Value> {
        let get = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v: &HeaderValue| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "userId": get(X_USER_ID),
            "role": get(X_USER_ROLE),
            "requestId": get(X_REQUEST_ID),
        }))
    }

    async fn whoami(Identity(caller): Identity) -> Json<Value> {
        Json(json!({ "userId": caller.user_id, "role": caller.role }))
    }

    fn app() -> Router {
        let state = state();
        let router = Router::new()
            .route("/users/profile", get(whoami))
            .fallback(echo);
        apply(router, state)
    }

    fn token(user_id: i64, role: Role) -> String {
        codec().issue(user_id, "user@example.com", role).unwrap()
    }

    fn request(method: Method, path: &str, headers: &[(&str, &str)]) -> Request {
        let mut builder = axum::http::Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(req: Request) -> (StatusCode, HeaderMap, Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn protected_paths_without_token_are_missing_token() {
        for (method, path) in [
            (Method::GET, "/properties/mine"),
            (Method::POST, "/properties"),
            (Method::GET, "/users/address"),
            (Method::GET, "/auth/me"),
            (Method::GET, "/not/a/known/route"),
            (Method::GET, "/properties/admin"),
        ] {
            let (status, headers, body) = send(request(method.clone(), path, &[])).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
            assert_eq!(body["reason"], "missing-token", "{method} {path}");
            assert!(headers.contains_key(X_REQUEST_ID));
        }
    }

    #[tokio::test]
    async fn dot_segments_are_resolved_before_classification() {
        for path in [
            "/properties/search/../admin",
            "/properties/search/%2e%2e/mine",
            "/properties/search/.%2E/../users/address",
        ] {
            let (status, _, body) = send(request(Method::GET, path, &[])).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["reason"], "missing-token", "{path}");
        }

        // Still public once resolved
        let (status, _, _) = send(request(Method::GET, "/properties/mine/../search", &[])).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_missing_token() {
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[("authorization", "Basic dXNlcjpwdw==")],
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "missing-token");
    }

    #[tokio::test]
    async fn preflight_is_forwarded_without_authentication() {
        for path in ["/properties/admin", "/users/address", "/anything"] {
            let (status, _, body) = send(request(
                Method::OPTIONS,
                path,
                &[("authorization", "Bearer garbage")],
            ))
            .await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body["userId"], Value::Null);
        }
    }

    #[tokio::test]
    async fn public_routes_ignore_tokens_entirely() {
        let bearer = format!("Bearer {}", token(42, Role::Customer));
        for auth in [bearer.as_str(), "Bearer not-a-jwt"] {
            let (status, _, body) = send(request(
                Method::POST,
                "/auth/login",
                &[("authorization", auth), ("x-user-id", "7")],
            ))
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["userId"].is_null());
            assert!(body["role"].is_null());
        }
    }

    #[tokio::test]
    async fn public_browse_needs_no_token() {
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/12",
            &[("x-user-id", "999"), ("x-user-role", "ADMIN")],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], Value::Null);
        assert_eq!(body["role"], Value::Null);
    }

    #[tokio::test]
    async fn public_browse_is_enriched_by_a_valid_token() {
        let bearer = format!("Bearer {}", token(42, Role::Customer));
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/search?city=Oslo",
            &[
                ("authorization", bearer.as_str()),
                ("x-user-id", "999"),
                ("x-user-role", "ADMIN"),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "42");
        assert_eq!(body["role"], "CUSTOMER");
    }

    #[tokio::test]
    async fn public_browse_swallows_bad_tokens() {
        let (status, _, body) = send(request(
            Method::GET,
            "/properties",
            &[("authorization", "Bearer not.a.token")],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], Value::Null);
    }

    #[tokio::test]
    async fn spoofed_identity_headers_are_overwritten() {
        let bearer = format!("Bearer {}", token(42, Role::Customer));
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[
                ("authorization", bearer.as_str()),
                ("X-USER-ID", "999"),
                ("X-USER-ROLE", "ADMIN"),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "42");
        assert_eq!(body["role"], "CUSTOMER");
    }

    #[tokio::test]
    async fn downstream_guard_sees_token_identity() {
        let bearer = format!("Bearer {}", token(7, Role::Admin));
        let (status, _, body) = send(request(
            Method::GET,
            "/users/profile",
            &[("authorization", bearer.as_str()), ("x-user-id", "999")],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], 7);
        assert_eq!(body["role"], "ADMIN");
    }

    #[tokio::test]
    async fn admin_namespace_requires_admin_role() {
        let customer = format!("Bearer {}", token(42, Role::Customer));
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/admin",
            &[("authorization", customer.as_str())],
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "forbidden-role");

        let admin = format!("Bearer {}", token(1, Role::Admin));
        let (status, _, body) = send(request(
            Method::PUT,
            "/properties/admin/5/approve",
            &[("authorization", admin.as_str())],
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "ADMIN");
    }

    #[tokio::test]
    async fn expiry_honours_clock_skew() {
        let lifetime = Duration::seconds(identity::token::TOKEN_LIFETIME_SECONDS);

        let issued = Utc::now() - lifetime - Duration::seconds(31);
        let expired = codec()
            .issue_at(42, "u@example.com", Role::Customer, issued)
            .unwrap();
        let bearer = format!("Bearer {expired}");
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[("authorization", bearer.as_str())],
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "expired");

        let issued = Utc::now() - lifetime - Duration::seconds(10);
        let within_skew = codec()
            .issue_at(42, "u@example.com", Role::Customer, issued)
            .unwrap();
        let bearer = format!("Bearer {within_skew}");
        let (status, _, _) = send(request(
            Method::GET,
            "/properties/mine",
            &[("authorization", bearer.as_str())],
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn verification_failures_keep_their_reason() {
        let foreign = TokenCodec::new(b"another-secret-another-secret-another")
            .unwrap()
            .issue(42, "u@example.com", Role::Customer)
            .unwrap();
        let bearer = format!("Bearer {foreign}");
        let (status, _, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[("authorization", bearer.as_str())],
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "invalid-signature");

        let (status, _, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[("authorization", "Bearer garbage")],
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "malformed-claims");
    }

    #[tokio::test]
    async fn correlation_id_is_regenerated_and_echoed() {
        let bearer = format!("Bearer {}", token(42, Role::Customer));
        let (status, headers, body) = send(request(
            Method::GET,
            "/properties/mine",
            &[
                ("authorization", bearer.as_str()),
                ("x-request-id", "client-chosen"),
            ],
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let forwarded = body["requestId"].as_str().unwrap();
        assert_ne!(forwarded, "client-chosen");
        assert!(Uuid::parse_str(forwarded).is_ok());
        assert_eq!(headers[X_REQUEST_ID], forwarded);
    }

    #[tokio::test]
    async fn unclassified_request_is_treated_as_protected() {
        // authenticate without classify in front of it
        let router = Router::new()
            .fallback(echo)
            .layer(middleware::from_fn_with_state(state(), authenticate));

        let res = router
            .oneshot(request(Method::GET, "/properties", &[]))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
