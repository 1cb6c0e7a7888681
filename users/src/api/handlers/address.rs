use axum::{Json, extract::State, http::StatusCode};
use identity::Identity;

use crate::api::dto::address::{AddressRequest, AddressResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn add_address(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<AddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), AppError> {
    let new = req.validate().map_err(AppError::InvalidRequest)?;
    let address = state.profiles.add_address(caller.user_id, new).await?;

    Ok((StatusCode::CREATED, Json(address.into())))
}

pub async fn list_addresses(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<Json<Vec<AddressResponse>>, AppError> {
    let addresses = state.profiles.list_addresses(caller.user_id).await?;
    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}
