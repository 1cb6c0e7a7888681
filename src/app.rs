/*
 * Responsibility
 * - Config -> shared state -> Router
 * - Middleware order (inner to outer): edge filter, http, security headers, cors
 * - axum::serve()
 */
use std::{panic, process, time::Duration};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use identity::TokenCodec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::middleware::{cors, edge, http, security_headers};
use crate::proxy::{self, Upstreams};
use crate::routes::RouteTable;
use crate::state::AppState;

// Headroom over the upstream timeout so a slow upstream surfaces as 504 from the proxy
const EDGE_TIMEOUT_HEADROOM: Duration = Duration::from_secs(5);

fn init_tracing() {
    // RUST_LOG=info,gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let codec = TokenCodec::new(config.jwt_secret.as_bytes()).context("JWT_SECRET")?;
    let routes = RouteTable::standard().context("route table")?;

    let upstreams = Upstreams::new()
        .with("/auth", config.auth_service_url.clone())
        .with("/properties", config.listing_service_url.clone())
        .with("/users", config.user_service_url.clone());

    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("upstream http client")?;

    Ok(AppState::new(codec, routes, upstreams, http))
}

fn build_router(state: AppState, config: &Config) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .fallback(proxy::forward)
        .with_state(state.clone());

    let router = edge::apply(router, state);
    let router = http::apply(router, config.upstream_timeout + EDGE_TIMEOUT_HEADROOM);
    let router = security_headers::apply(router);
    cors::apply(router, config)
}
