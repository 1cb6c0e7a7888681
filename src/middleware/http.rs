//! HTTP-level middleware for the edge.
//!
//! Responsibility:
//! - Access logging / request tracing (TraceLayer)
//! - Body size limit
//! - Overall request timeout
//!
//! Request ids are not generated here: the edge filter always mints its own
//! and a generic request-id layer would keep whatever the client sent.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::proxy::MAX_BODY_BYTES;

/// Apply HTTP-level middleware. `timeout` bounds the whole request, upstream call included.
pub fn apply(router: Router, timeout: Duration) -> Router {
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
