use identity::Role;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    /// False when the account was created but the empty profile could not be.
    pub profile_provisioned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}
