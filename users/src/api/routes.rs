use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{address, profile};
use crate::state::AppState;

/// Mounted under `/users`. Every route requires the edge-injected identity.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_profile)
                .post(profile::save_profile)
                .put(profile::save_profile),
        )
        .route(
            "/address",
            get(address::list_addresses).post(address::add_address),
        )
        .route(
            "/profile-full",
            post(profile::save_profile_full).put(profile::save_profile_full),
        )
}
