use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use identity::{Identity, headers::request_id};

use crate::api::dto::{
    credentials::Credentials,
    responses::{MeResponse, RegisterResponse, TokenResponse},
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let out = state
        .accounts
        .register(&req.email, &req.password, request_id(&headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: out.account.id,
            email: out.account.email,
            role: out.account.role,
            profile_provisioned: out.profile_provisioned,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<TokenResponse>, AppError> {
    let out = state.accounts.login(&req.email, &req.password).await?;

    Ok(Json(TokenResponse {
        access_token: out.access_token,
        token_type: "Bearer",
        expires_in: out.expires_in,
    }))
}

/// Protected: the caller is whoever the edge verified.
pub async fn me(
    State(state): State<AppState>,
    Identity(caller): Identity,
) -> Result<Json<MeResponse>, AppError> {
    let account = state.accounts.account(caller.user_id).await?;

    Ok(Json(MeResponse {
        user_id: account.id,
        email: account.email,
        role: caller.role,
    }))
}
