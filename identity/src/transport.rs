//! HTTP transport layers shared by the downstream services.
//!
//! Responsibility:
//! - Request-Id generation + propagation (`x-request-id`), keeping one the edge already set
//! - Access logging / request tracing (TraceLayer)
//! - Body size limit
//! - Per-request timeout
//!
//! The edge does not use this stack: it owns `x-request-id` itself and must
//! overwrite anything a client sends.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::headers::X_REQUEST_ID;

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the default transport stack: 1 MiB body limit, 30 second timeout.
pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    apply_with(router, DEFAULT_BODY_LIMIT, DEFAULT_TIMEOUT)
}

pub fn apply_with<S>(router: Router<S>, body_limit: usize, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
