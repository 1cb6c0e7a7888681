//! CORS for the browser frontend.
//!
//! - Development: any origin
//! - Production: only `CORS_ALLOWED_ORIGINS`; an empty list allows nothing
//!
//! Credentials are never allowed: the bearer token travels in `Authorization`,
//! not in cookies. Pre-flights are answered here and never reach the edge filter.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use identity::headers::X_REQUEST_ID;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(10 * 60);

fn allow_origin(config: &Config) -> AllowOrigin {
    if !config.app_env.is_production() {
        return AllowOrigin::from(Any);
    }

    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    AllowOrigin::list(allowed)
}

pub fn apply(router: Router, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(config))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([X_REQUEST_ID])
        .max_age(PREFLIGHT_MAX_AGE);

    router.layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn config(pairs: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    async fn preflight(config: &Config, origin: &str) -> Option<HeaderValue> {
        let app = apply(Router::new().route("/properties", get(|| async { "[]" })), config);
        let res = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/properties")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn development_allows_any_origin() {
        let config = config(&[("JWT_SECRET", "s")]);
        assert_eq!(
            preflight(&config, "http://localhost:5173").await.unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn production_uses_the_allowlist() {
        let config = config(&[
            ("JWT_SECRET", "s"),
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com"),
        ]);

        assert_eq!(
            preflight(&config, "https://app.example.com").await.unwrap(),
            "https://app.example.com"
        );
        assert!(preflight(&config, "https://evil.example.com").await.is_none());
    }
}
