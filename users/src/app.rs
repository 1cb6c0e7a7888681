use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::repos::{MemoryProfileRepo, PgProfileRepo, ProfileRepo};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,users=debug cargo run -p users
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let repo = build_repo(&config).await?;
    tracing::info!(
        backend = repo.backend_name(),
        "starting users service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let app = build_router(AppState::new(repo));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_repo(config: &Config) -> anyhow::Result<Arc<dyn ProfileRepo>> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            let repo = PgProfileRepo::new(pool);
            repo.migrate().await.context("profile migrations")?;
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, profiles are kept in memory");
            Ok(Arc::new(MemoryProfileRepo::new()))
        }
    }
}

fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/users", api::routes())
        .with_state(state);

    identity::transport::apply(router)
}
