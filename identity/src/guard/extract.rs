use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::{IdentityContext, core};
use crate::error::AuthError;
use crate::role::Role;

/// Extractor for protected operations: both identity headers must be present.
///
/// ```ignore
/// async fn create(Identity(caller): Identity, Json(req): Json<NewThing>) -> ... {
///     repo.create(caller.user_id, req).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub IdentityContext);

/// Extractor for admin-only operations.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub IdentityContext);

/// Extractor for public operations that personalise for known callers.
/// Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<IdentityContext>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        core::authorize(&parts.headers, None).map(Identity)
    }
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        core::authorize(&parts.headers, Some(Role::Admin)).map(AdminIdentity)
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(core::identify(&parts.headers)))
    }
}
