use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity::Role;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account persistence. Emails are stored normalised (trimmed, lower-case)
/// and are unique; inserting a taken email is `RepoError::Conflict`.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(&self, new: NewAccount) -> RepoResult<Account>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Account>>;
}
