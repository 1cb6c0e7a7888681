use axum::{Json, extract::State};
use identity::Identity;

use crate::api::dto::profile::{
    ProfileFullRequest, ProfileFullResponse, ProfileRequest, ProfileResponse,
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profiles.find_profile(caller.user_id).await?;

    Ok(Json(
        profile
            .map(ProfileResponse::from)
            .unwrap_or_else(|| ProfileResponse::empty(caller.user_id)),
    ))
}

/// Serves both POST and PUT: a profile is created on first write and
/// replaced afterwards.
pub async fn save_profile(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let update = req.validate().map_err(AppError::InvalidRequest)?;
    let profile = state.profiles.upsert_profile(caller.user_id, update).await?;

    tracing::info!(
        user_id = caller.user_id,
        request_id = caller.correlation_id.as_deref(),
        "profile saved"
    );
    Ok(Json(profile.into()))
}

pub async fn save_profile_full(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<ProfileFullRequest>,
) -> Result<Json<ProfileFullResponse>, AppError> {
    let update = req.profile.validate().map_err(AppError::InvalidRequest)?;
    let address = req.address.validate().map_err(AppError::InvalidRequest)?;

    let (profile, address) = state
        .profiles
        .save_profile_and_address(caller.user_id, update, address)
        .await?;

    tracing::info!(user_id = caller.user_id, address_id = address.id, "profile and address saved");
    Ok(Json(ProfileFullResponse {
        profile: profile.into(),
        address: address.into(),
    }))
}
