/*
 * Responsibility
 * - Listing entity, its moderation status and the persistence interface
 * - Owner ids come from the guard's identity, never from request bodies
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoResult;

/// Moderation state. New listings start PENDING; only PENDING can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Pending => "PENDING",
            ListingStatus::Approved => "APPROVED",
            ListingStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ListingStatus::Pending),
            "APPROVED" => Ok(ListingStatus::Approved),
            "REJECTED" => Ok(ListingStatus::Rejected),
            other => Err(format!("unknown listing status {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub price: f64,
    pub area_sqft: Option<f64>,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub image_url: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything a caller may set. No owner, no status.
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub price: f64,
    pub area_sqft: Option<f64>,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub image_url: Option<String>,
}

/// Conjunctive filter; `None` fields do not constrain. Text matches ignore case.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub owner_id: Option<i64>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: i64,
    pub offset: i64,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        let eq = |want: &Option<String>, have: &str| {
            want.as_deref()
                .is_none_or(|w| w.eq_ignore_ascii_case(have))
        };

        self.status.is_none_or(|s| s == listing.status)
            && self.owner_id.is_none_or(|o| o == listing.owner_id)
            && eq(&self.city, &listing.city)
            && eq(&self.property_type, &listing.property_type)
            && self.min_price.is_none_or(|p| listing.price >= p)
            && self.max_price.is_none_or(|p| listing.price <= p)
    }
}

#[async_trait]
pub trait ListingRepo: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(&self, owner_id: i64, new: NewListing) -> RepoResult<Listing>;

    async fn get(&self, id: i64) -> RepoResult<Option<Listing>>;

    /// Newest first.
    async fn search(&self, filter: &ListingFilter) -> RepoResult<Vec<Listing>>;

    /// Compare-and-set on status: `NotFound` for an unknown id, `Conflict`
    /// when the current status is not `expected`.
    async fn update_status(
        &self,
        id: i64,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> RepoResult<Listing>;
}
