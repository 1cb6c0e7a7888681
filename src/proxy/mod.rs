//! Reverse proxy from the edge to the internal services.
//!
//! Runs after the edge filter, so the request it sees already carries the
//! verified identity headers (or none). Bodies are buffered; there are no
//! retries.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, header},
    response::Response,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::AppError;
use crate::routes::segment_prefix;
use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Path prefix -> service base URL. First match wins; prefixes are segment-aware.
#[derive(Debug, Clone, Default)]
pub struct Upstreams {
    routes: Vec<(String, Url)>,
}

impl Upstreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prefix: impl Into<String>, base: Url) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        self.routes.push((prefix, base));
        self
    }

    pub fn resolve(&self, path: &str) -> Option<&Url> {
        self.routes
            .iter()
            .find(|(prefix, _)| segment_prefix(path, prefix))
            .map(|(_, base)| base)
    }
}

/// Connection-scoped headers that must not cross the proxy.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    const HOP_BY_HOP: [&str; 8] = [
        "connection",
        "keep-alive",
        "proxy-authenticate",
        "proxy-authorization",
        "te",
        "trailer",
        "transfer-encoding",
        "upgrade",
    ];
    HOP_BY_HOP.contains(&name.as_str())
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| {
            !is_hop_by_hop(name) && *name != header::HOST && *name != header::CONTENT_LENGTH
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

const NORMALIZE_ORIGIN: &str = "http://edge.invalid";

/// Resolve `.` and `..` segments (plain or percent-encoded) and backslashes
/// exactly as `Url` does when the upstream URL is built.
///
/// The edge classifies the result of this function, so the path that is
/// authorized is the path that is forwarded.
pub fn normalize_path_and_query(raw: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(&format!("{NORMALIZE_ORIGIN}{raw}"))?;
    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

fn target_url(base: &Url, req: &Request) -> Result<Url, AppError> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    // Already normalized by the edge; parsing again leaves it unchanged
    let raw = format!("{}{}", base.as_str().trim_end_matches('/'), path_and_query);
    Url::parse(&raw).map_err(|e| {
        warn!(error = %e, "failed to build upstream url");
        AppError::Internal
    })
}

/// Router fallback: forward everything that is not served by the edge itself.
pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();
    let base = state.upstreams.resolve(&path).ok_or_else(|| {
        debug!(path = %path, "no upstream for path");
        AppError::NoUpstream
    })?;

    let url = target_url(base, &req)?;
    let method = req.method().clone();
    let headers = forwardable(req.headers());

    let body = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            warn!(path = %path, error = %e, "failed to read request body");
            AppError::PayloadTooLarge
        })?;

    let upstream = state
        .http
        .request(method.clone(), url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(method = %method, path = %path, error = %e, "upstream request failed");
            if e.is_timeout() {
                AppError::GatewayTimeout
            } else {
                AppError::BadGateway
            }
        })?;

    let status = upstream.status();
    let response_headers = forwardable(upstream.headers());
    let bytes = upstream.bytes().await.map_err(|e| {
        warn!(method = %method, path = %path, error = %e, "failed to read upstream body");
        AppError::BadGateway
    })?;

    debug!(method = %method, path = %path, %status, "upstream responded");

    let mut res = Response::new(Body::from(bytes));
    *res.status_mut() = status;
    res.headers_mut().extend(response_headers);
    Ok(res)
}
