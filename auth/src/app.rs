use std::{panic, process, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use identity::{IdentityClient, TokenCodec};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::repos::{AccountRepo, MemoryAccountRepo, PgAccountRepo};
use crate::services::account_service::AccountService;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,auth=debug,tower_http=debug cargo run -p auth
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

        // Development fails fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting auth service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let codec = TokenCodec::new(config.jwt_secret.as_bytes()).context("JWT_SECRET")?;

    let repo: Arc<dyn AccountRepo> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            let repo = PgAccountRepo::new(pool);
            repo.migrate().await.context("account migrations")?;
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(MemoryAccountRepo::new())
        }
    };

    let profiles = IdentityClient::new(config.user_service_url.clone(), config.provisioning_timeout)
        .context("user service client")?;

    let accounts = AccountService::new(repo, Arc::new(codec), profiles);

    if let Some(admin) = &config.bootstrap_admin {
        accounts
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("bootstrap admin")?;
    }

    Ok(AppState::new(Arc::new(accounts)))
}

fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/auth", api::routes())
        .with_state(state);

    identity::transport::apply(router)
}
