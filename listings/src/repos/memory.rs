use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::listing_repo::{Listing, ListingFilter, ListingRepo, ListingStatus, NewListing};

/// Process-local store used when no DATABASE_URL is configured.
#[derive(Debug, Default)]
pub struct MemoryListingRepo {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryListingRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepo for MemoryListingRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, owner_id: i64, new: NewListing) -> RepoResult<Listing> {
        let mut listings = self.listings.write().await;
        let now = Utc::now();

        let listing = Listing {
            id: listings.len() as i64 + 1,
            owner_id,
            title: new.title,
            description: new.description,
            property_type: new.property_type,
            price: new.price,
            area_sqft: new.area_sqft,
            address_line: new.address_line,
            city: new.city,
            state: new.state,
            pincode: new.pincode,
            image_url: new.image_url,
            status: ListingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        listings.push(listing.clone());
        Ok(listing)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn search(&self, filter: &ListingFilter) -> RepoResult<Vec<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings
            .iter()
            .rev()
            .filter(|l| filter.matches(l))
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: i64,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> RepoResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RepoError::NotFound)?;

        if listing.status != expected {
            return Err(RepoError::Conflict(format!(
                "listing is {}, expected {}",
                listing.status, expected
            )));
        }

        listing.status = next;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_listing(city: &str) -> NewListing {
        NewListing {
            title: "Flat".into(),
            property_type: "APARTMENT".into(),
            price: 100.0,
            city: city.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn created_listings_are_pending_and_owned() {
        let repo = MemoryListingRepo::new();
        let l = repo.create(42, new_listing("Pune")).await.unwrap();
        assert_eq!(l.owner_id, 42);
        assert_eq!(l.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn status_moves_only_from_expected() {
        let repo = MemoryListingRepo::new();
        let l = repo.create(42, new_listing("Pune")).await.unwrap();

        let approved = repo
            .update_status(l.id, ListingStatus::Pending, ListingStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, ListingStatus::Approved);

        let again = repo
            .update_status(l.id, ListingStatus::Pending, ListingStatus::Rejected)
            .await;
        assert!(matches!(again, Err(RepoError::Conflict(_))));

        let missing = repo
            .update_status(99, ListingStatus::Pending, ListingStatus::Approved)
            .await;
        assert!(matches!(missing, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn search_is_newest_first_and_paged() {
        let repo = MemoryListingRepo::new();
        for city in ["A", "B", "C"] {
            repo.create(1, new_listing(city)).await.unwrap();
        }

        let page = repo
            .search(&ListingFilter {
                limit: 2,
                offset: 0,
                ..Default::default()
            })
            .await
            .unwrap();
        let cities: Vec<_> = page.iter().map(|l| l.city.as_str()).collect();
        assert_eq!(cities, ["C", "B"]);

        let rest = repo
            .search(&ListingFilter {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
    }
}
