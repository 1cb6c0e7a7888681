use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::repos::{ListingRepo, MemoryListingRepo, PgListingRepo};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,listings=debug cargo run -p listings
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
        "starting listings service in {:?} mode on {}",
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

async fn build_repo(config: &Config) -> anyhow::Result<Arc<dyn ListingRepo>> {
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            let repo = PgListingRepo::new(pool);
            repo.migrate().await.context("listing migrations")?;
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, listings are kept in memory");
            Ok(Arc::new(MemoryListingRepo::new()))
        }
    }
}

fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .nest("/properties", api::routes())
        .with_state(state);

    identity::transport::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Arc::new(MemoryListingRepo::new())))
    }

    fn request(method: Method, uri: &str, caller: Option<(i64, &str)>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = caller {
            builder = builder
                .header("x-user-id", id.to_string())
                .header("x-user-role", role);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    const OWNER: (i64, &str) = (42, "CUSTOMER");
    const OTHER: (i64, &str) = (43, "CUSTOMER");
    const ADMIN: (i64, &str) = (1, "ADMIN");

    fn listing(city: &str, price: f64) -> Value {
        json!({
            "title": format!("Flat in {city}"),
            "propertyType": "APARTMENT",
            "price": price,
            "city": city,
        })
    }

    async fn create(app: &Router, body: Value) -> i64 {
        let (status, created) = call(app, request(Method::POST, "/properties", Some(OWNER), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        created["id"].as_i64().unwrap()
    }

    async fn approve(app: &Router, id: i64) -> StatusCode {
        let uri = format!("/properties/admin/{id}/approve");
        call(app, request(Method::PUT, &uri, Some(ADMIN), None)).await.0
    }

    #[tokio::test]
    async fn create_stamps_owner_from_identity_not_body() {
        let app = app();
        let mut body = listing("Pune", 100.0);
        body["ownerId"] = json!(999);
        body["status"] = json!("APPROVED");

        let (status, created) = call(&app, request(Method::POST, "/properties", Some(OWNER), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["ownerId"], 42);
        assert_eq!(created["status"], "PENDING");
        assert_eq!(created["ownedByCaller"], true);
    }

    #[tokio::test]
    async fn create_requires_identity() {
        let (status, body) = call(
            &app(),
            request(Method::POST, "/properties", None, Some(listing("Pune", 1.0))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "missing-identity-headers");
    }

    #[tokio::test]
    async fn browse_shows_only_approved_and_enriches_known_callers() {
        let app = app();
        let approved = create(&app, listing("Pune", 100.0)).await;
        let _pending = create(&app, listing("Mumbai", 200.0)).await;
        assert_eq!(approve(&app, approved).await, StatusCode::OK);

        let (status, body) = call(&app, request(Method::GET, "/properties", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], approved);
        assert!(items[0].get("ownedByCaller").is_none());

        let (_, body) = call(&app, request(Method::GET, "/properties", Some(OWNER), None)).await;
        assert_eq!(body[0]["ownedByCaller"], true);

        let (_, body) = call(&app, request(Method::GET, "/properties", Some(OTHER), None)).await;
        assert_eq!(body[0]["ownedByCaller"], false);
    }

    #[tokio::test]
    async fn search_filters_approved_listings() {
        let app = app();
        for (city, price) in [("Pune", 100.0), ("pune", 300.0), ("Delhi", 150.0)] {
            let id = create(&app, listing(city, price)).await;
            approve(&app, id).await;
        }
        create(&app, listing("Pune", 120.0)).await;

        let (status, body) = call(
            &app,
            request(Method::GET, "/properties/search?city=PUNE&maxPrice=200", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["price"], 100.0);

        let (status, _) = call(
            &app,
            request(Method::GET, "/properties/search?minPrice=5&maxPrice=1", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pending_listing_is_visible_to_owner_and_admin_only() {
        let app = app();
        let id = create(&app, listing("Pune", 100.0)).await;
        let uri = format!("/properties/{id}");

        let (status, _) = call(&app, request(Method::GET, &uri, None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, request(Method::GET, &uri, Some(OTHER), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, request(Method::GET, &uri, Some(OWNER), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "PENDING");

        let (status, _) = call(&app, request(Method::GET, &uri, Some(ADMIN), None)).await;
        assert_eq!(status, StatusCode::OK);

        approve(&app, id).await;
        let (status, _) = call(&app, request(Method::GET, &uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, request(Method::GET, "/properties/777", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mine_lists_every_status_for_the_caller() {
        let app = app();
        let first = create(&app, listing("Pune", 100.0)).await;
        create(&app, listing("Pune", 200.0)).await;
        approve(&app, first).await;

        let (status, body) = call(&app, request(Method::GET, "/properties/mine", Some(OWNER), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = call(&app, request(Method::GET, "/properties/mine", Some(OTHER), None)).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = call(&app, request(Method::GET, "/properties/mine", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_namespace_requires_admin_role() {
        let app = app();
        let id = create(&app, listing("Pune", 100.0)).await;

        let (status, body) = call(&app, request(Method::GET, "/properties/admin", Some(OWNER), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "forbidden-role");

        let (status, body) = call(&app, request(Method::GET, "/properties/admin", Some(ADMIN), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], id);

        let (status, body) = call(
            &app,
            request(Method::GET, "/properties/admin?status=APPROVED", Some(ADMIN), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn moderation_only_moves_pending_listings() {
        let app = app();
        let id = create(&app, listing("Pune", 100.0)).await;

        assert_eq!(approve(&app, id).await, StatusCode::OK);
        assert_eq!(approve(&app, id).await, StatusCode::CONFLICT);

        let uri = format!("/properties/admin/{id}/reject");
        let (status, body) = call(&app, request(Method::PUT, &uri, Some(ADMIN), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["reason"], "conflict");

        assert_eq!(approve(&app, 404).await, StatusCode::NOT_FOUND);

        let other = create(&app, listing("Pune", 100.0)).await;
        let uri = format!("/properties/admin/{other}/reject");
        let (status, body) = call(&app, request(Method::PUT, &uri, Some(ADMIN), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "REJECTED");
    }
}
