use axum::{
    Json,
    extract::{Path, Query, State},
};
use identity::AdminIdentity;

use crate::api::dto::{listing::ListingResponse, query::AdminQuery};
use crate::error::AppError;
use crate::repos::ListingStatus;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Query(query): Query<AdminQuery>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let filter = query.into_filter().map_err(AppError::InvalidRequest)?;
    let listings = state.listings.search(&filter).await?;

    Ok(Json(
        listings
            .into_iter()
            .map(|l| ListingResponse::from_listing(l, None))
            .collect(),
    ))
}

async fn moderate(
    state: &AppState,
    admin_id: i64,
    id: i64,
    next: ListingStatus,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = state
        .listings
        .update_status(id, ListingStatus::Pending, next)
        .await?;

    tracing::info!(listing_id = id, admin_id, status = %next, "listing moderated");
    Ok(Json(ListingResponse::from_listing(listing, None)))
}

pub async fn approve(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    moderate(&state, admin.user_id, id, ListingStatus::Approved).await
}

pub async fn reject(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    moderate(&state, admin.user_id, id, ListingStatus::Rejected).await
}
