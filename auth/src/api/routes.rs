use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::accounts::{login, me, register};
use crate::state::AppState;

/// Mounted under `/auth`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
