//! Identity header wire contract.
//!
//! `x-user-id` / `x-user-role` are only ever written by a component that
//! verified a token (the edge) or forwards an already verified identity
//! (`IdentityClient`). Anything a client sent under these names is removed
//! first.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, HeaderName},
};

use crate::role::Role;

pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Remove every value of the identity and correlation headers.
pub fn strip_identity(headers: &mut HeaderMap) {
    headers.remove(X_USER_ID);
    headers.remove(X_USER_ROLE);
    headers.remove(X_REQUEST_ID);
}

pub fn inject_identity(headers: &mut HeaderMap, user_id: i64, role: Role) {
    headers.insert(X_USER_ID, HeaderValue::from(user_id));
    headers.insert(X_USER_ROLE, HeaderValue::from_static(role.as_str()));
}

/// Set the correlation id. Ids that are not valid header values are ignored.
pub fn set_request_id(headers: &mut HeaderMap, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }
}

pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is compared case-insensitively. Any other scheme counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("Bearer")
        .then_some(token.trim())
        .filter(|t| !t.is_empty())
}
