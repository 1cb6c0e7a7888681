use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use identity::{Identity, MaybeIdentity};

use crate::api::dto::{
    listing::{CreateListingRequest, ListingResponse},
    query::{PageQuery, SearchQuery},
};
use crate::error::AppError;
use crate::repos::{ListingFilter, ListingStatus};
use crate::state::AppState;

fn caller_id(caller: &MaybeIdentity) -> Option<i64> {
    caller.0.as_ref().map(|c| c.user_id)
}

/// Public: approved listings, newest first.
pub async fn browse(
    State(state): State<AppState>,
    caller: MaybeIdentity,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let filter = page.into_filter(ListingFilter {
        status: Some(ListingStatus::Approved),
        ..Default::default()
    });
    let listings = state.listings.search(&filter).await?;

    let caller = caller_id(&caller);
    Ok(Json(
        listings
            .into_iter()
            .map(|l| ListingResponse::from_listing(l, caller))
            .collect(),
    ))
}

pub async fn search(
    State(state): State<AppState>,
    caller: MaybeIdentity,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let filter = query.into_filter().map_err(AppError::InvalidRequest)?;
    let listings = state.listings.search(&filter).await?;

    let caller = caller_id(&caller);
    Ok(Json(
        listings
            .into_iter()
            .map(|l| ListingResponse::from_listing(l, caller))
            .collect(),
    ))
}

/// Approved listings are public. Anything else is visible to its owner and
/// to admins only, and looks missing to everyone else.
pub async fn get_by_id(
    State(state): State<AppState>,
    MaybeIdentity(caller): MaybeIdentity,
    Path(id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = state.listings.get(id).await?.ok_or(AppError::NotFound)?;

    let visible = listing.status == ListingStatus::Approved
        || caller
            .as_ref()
            .is_some_and(|c| c.is_admin() || c.user_id == listing.owner_id);
    if !visible {
        return Err(AppError::NotFound);
    }

    Ok(Json(ListingResponse::from_listing(
        listing,
        caller.map(|c| c.user_id),
    )))
}

/// Protected: the owner is always the verified caller.
pub async fn create(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), AppError> {
    let new = req.validate().map_err(AppError::InvalidRequest)?;
    let listing = state.listings.create(caller.user_id, new).await?;

    tracing::info!(
        listing_id = listing.id,
        owner_id = caller.user_id,
        request_id = caller.correlation_id.as_deref(),
        "listing created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ListingResponse::from_listing(listing, Some(caller.user_id))),
    ))
}

/// Protected: the caller's own listings in every status.
pub async fn mine(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let filter = page.into_filter(ListingFilter {
        owner_id: Some(caller.user_id),
        ..Default::default()
    });
    let listings = state.listings.search(&filter).await?;

    Ok(Json(
        listings
            .into_iter()
            .map(|l| ListingResponse::from_listing(l, Some(caller.user_id)))
            .collect(),
    ))
}
