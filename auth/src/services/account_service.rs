//! Registration, login and admin bootstrap.
//!
//! Registration writes the account first and then provisions an empty user
//! profile through the identity-propagation client. The two writes are not
//! atomic: a failed provisioning call is logged and reported on the response,
//! and the account is kept.

use std::sync::Arc;

use axum::http::Method;
use identity::{IdentityClient, Role, TargetOperation, TokenCodec, TokenError, Visibility};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::repos::{Account, AccountRepo, NewAccount, RepoError};
use crate::services::password::{self, PasswordError};

/// Profile creation in the users service. Declared Protected there.
pub const CREATE_PROFILE: TargetOperation =
    TargetOperation::new(Method::POST, "/users/profile", Visibility::Protected);

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("blocking task failed: {0}")]
    Join(#[from] JoinError),
}

#[derive(Debug)]
pub struct Registered {
    pub account: Account,
    pub profile_provisioned: bool,
}

#[derive(Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct AccountService {
    repo: Arc<dyn AccountRepo>,
    codec: Arc<TokenCodec>,
    profiles: IdentityClient,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepo>, codec: Arc<TokenCodec>, profiles: IdentityClient) -> Self {
        Self {
            repo,
            codec,
            profiles,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        correlation_id: Option<&str>,
    ) -> Result<Registered, AccountError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::Invalid("password must be at least 8 characters"));
        }

        let account = self.create(email, password, Role::Customer).await?;
        info!(user_id = account.id, backend = self.repo.backend_name(), "account registered");

        let payload = json!({ "fullName": "", "phone": "", "gender": "UNKNOWN" });
        let profile_provisioned = match self
            .profiles
            .call_with_identity(&CREATE_PROFILE, account.id, account.role, correlation_id, &payload)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                // Account stays; the profile can be created later via POST /users/profile
                warn!(user_id = account.id, error = %e, "profile provisioning failed");
                false
            }
        };

        Ok(Registered {
            account,
            profile_provisioned,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AccountError> {
        let email = normalize_email(email).map_err(|_| AccountError::InvalidCredentials)?;

        let Some(account) = self.repo.find_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        let phc = account.password_hash.clone();
        let password = password.to_string();
        let valid =
            tokio::task::spawn_blocking(move || password::verify_password(&phc, &password)).await?;
        if !valid {
            warn!(user_id = account.id, "login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let access_token = self.codec.issue(account.id, &account.email, account.role)?;
        info!(user_id = account.id, role = %account.role, "token issued");

        Ok(IssuedToken {
            access_token,
            expires_in: self.codec.lifetime_seconds(),
        })
    }

    pub async fn account(&self, id: i64) -> Result<Account, AccountError> {
        self.repo.find_by_id(id).await?.ok_or(AccountError::NotFound)
    }

    /// Create the configured admin account unless the email already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = normalize_email(email)?;
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = existing.id, "bootstrap admin email belongs to a non-admin account");
            }
            return Ok(existing);
        }

        let account = self.create(email, password, Role::Admin).await?;
        info!(user_id = account.id, "bootstrap admin created");
        Ok(account)
    }

    async fn create(&self, email: String, password: &str, role: Role) -> Result<Account, AccountError> {
        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || password::hash_password(&password)).await??;

        self.repo
            .create(NewAccount {
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AccountError::EmailTaken,
                other => AccountError::Repo(other),
            })
    }
}

fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AccountError::Invalid("a valid email is required")),
    }
}
