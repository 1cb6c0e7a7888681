use serde::Deserialize;

/// Body for `/auth/register` and `/auth/login`.
///
/// Unknown fields (including any `role`) are ignored: self-registration
/// always yields a CUSTOMER account.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
