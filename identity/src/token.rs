//! HS256 token codec shared by the auth service (issue) and the edge (verify).
//!
//! The signing key is loaded once at process start and handed to
//! `TokenCodec::new`. Rotating it requires a restart.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::role::Role;

pub const ISSUER: &str = "property-connect-auth";
pub const TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;
pub const CLOCK_SKEW_SECONDS: u64 = 30;
/// HS256 keys shorter than the hash output are refused.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key must be at least {MIN_SECRET_BYTES} bytes, got {len}")]
    WeakKey { len: usize },
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Verification failures, kept distinct so callers can log and respond differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("token is malformed or carries invalid claims")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Token payload.
///
/// `sub` is the account email; `userId` is the integer subject every service
/// keys its data on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("issuer", &ISSUER)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::WeakKey { len: secret.len() });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = CLOCK_SKEW_SECONDS;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn lifetime_seconds(&self) -> i64 {
        TOKEN_LIFETIME_SECONDS
    }

    /// Issue a token valid from now for the fixed lifetime.
    pub fn issue(&self, user_id: i64, email: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, email, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: email.to_string(),
            user_id,
            role,
            iat,
            exp: iat + TOKEN_LIFETIME_SECONDS,
            iss: ISSUER.to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(TokenError::Sign)
    }

    /// Check signature, issuer and expiry (with clock-skew leeway) and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyError::InvalidSignature
                }
                _ => VerifyError::Malformed,
            })?;

        let claims = data.claims;
        if claims.exp <= claims.iat || claims.sub.trim().is_empty() {
            return Err(VerifyError::Malformed);
        }

        Ok(claims)
    }
}
