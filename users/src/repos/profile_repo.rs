/*
 * Responsibility
 * - Profile and address entities keyed by the verified user id
 * - One profile per user (upsert), any number of addresses
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::RepoResult;

pub const UNKNOWN_GENDER: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: String,
    pub phone: String,
    pub gender: String,
    pub updated_at: DateTime<Utc>,
}

/// Writable profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
    pub gender: String,
}

impl Default for ProfileUpdate {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            gender: UNKNOWN_GENDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAddress {
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Insert or replace the caller's profile.
    async fn upsert_profile(&self, user_id: i64, update: ProfileUpdate) -> RepoResult<Profile>;

    async fn find_profile(&self, user_id: i64) -> RepoResult<Option<Profile>>;

    async fn add_address(&self, user_id: i64, new: NewAddress) -> RepoResult<Address>;

    /// Oldest first.
    async fn list_addresses(&self, user_id: i64) -> RepoResult<Vec<Address>>;

    /// Both writes land or neither does.
    async fn save_profile_and_address(
        &self,
        user_id: i64,
        update: ProfileUpdate,
        new: NewAddress,
    ) -> RepoResult<(Profile, Address)>;
}
