use axum::{
    Router,
    routing::{get, put},
};

use crate::api::handlers::{admin, listings};
use crate::state::AppState;

/// Mounted under `/properties`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::browse).post(listings::create))
        .route("/search", get(listings::search))
        .route("/mine", get(listings::mine))
        .route("/{id}", get(listings::get_by_id))
        .route("/admin", get(admin::list))
        .route("/admin/{id}/approve", put(admin::approve))
        .route("/admin/{id}/reject", put(admin::reject))
}
