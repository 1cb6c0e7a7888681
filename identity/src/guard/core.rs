use axum::http::HeaderMap;
use tracing::warn;

use super::IdentityContext;
use crate::error::AuthError;
use crate::headers::{X_USER_ID, X_USER_ROLE, request_id};
use crate::role::Role;
use crate::visibility::Visibility;

fn header_str<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Re-validate the identity headers for a non-public operation.
///
/// This runs even behind the edge: the service must not assume the edge is its
/// only caller.
pub fn authorize(
    headers: &HeaderMap,
    required_role: Option<Role>,
) -> Result<IdentityContext, AuthError> {
    let (Some(raw_id), Some(raw_role)) = (
        header_str(headers, &X_USER_ID),
        header_str(headers, &X_USER_ROLE),
    ) else {
        warn!(reason = "missing-identity-headers", "identity headers absent");
        return Err(AuthError::MissingIdentityHeaders);
    };

    let user_id: i64 = raw_id.parse().map_err(|_| {
        warn!(reason = "missing-identity-headers", "x-user-id is not an integer");
        AuthError::MissingIdentityHeaders
    })?;

    let role: Role = raw_role.parse().map_err(|_| {
        warn!(user_id, reason = "forbidden-role", "unknown role in x-user-role");
        AuthError::ForbiddenRole
    })?;

    if let Some(required) = required_role
        && role != required
    {
        warn!(
            user_id,
            role = %role,
            required = %required,
            reason = "forbidden-role",
            "role not allowed for operation"
        );
        return Err(AuthError::ForbiddenRole);
    }

    let mut ctx = IdentityContext::new(user_id, role);
    if let Some(id) = request_id(headers) {
        ctx = ctx.with_correlation_id(id);
    }
    Ok(ctx)
}

/// Best-effort identity for public operations. Never fails.
pub fn identify(headers: &HeaderMap) -> Option<IdentityContext> {
    let user_id = header_str(headers, &X_USER_ID)?.parse().ok()?;
    let role = header_str(headers, &X_USER_ROLE)?.parse().ok()?;

    let mut ctx = IdentityContext::new(user_id, role);
    if let Some(id) = request_id(headers) {
        ctx = ctx.with_correlation_id(id);
    }
    Some(ctx)
}

/// Apply the declared visibility of an operation.
///
/// Public tiers never reject; they return whatever identity can be read.
pub fn guard(
    headers: &HeaderMap,
    visibility: Visibility,
) -> Result<Option<IdentityContext>, AuthError> {
    if visibility.requires_identity() {
        authorize(headers, visibility.required_role()).map(Some)
    } else {
        Ok(identify(headers))
    }
}
