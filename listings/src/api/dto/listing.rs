use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::{Listing, ListingStatus, NewListing};

/// Body for `POST /properties`.
///
/// `ownerId` and `status` are not part of the contract; when a client sends
/// them they are ignored like any other unknown field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: String,
    pub price: f64,
    pub area_sqft: Option<f64>,
    #[serde(default)]
    pub address_line: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    pub image_url: Option<String>,
}

impl CreateListingRequest {
    pub fn validate(self) -> Result<NewListing, String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.property_type.trim().is_empty() {
            return Err("propertyType must not be empty".into());
        }
        if self.city.trim().is_empty() {
            return Err("city must not be empty".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".into());
        }
        if let Some(area) = self.area_sqft
            && (!area.is_finite() || area <= 0.0)
        {
            return Err("areaSqft must be positive".into());
        }

        Ok(NewListing {
            title: self.title.trim().to_string(),
            description: self.description,
            property_type: self.property_type.trim().to_string(),
            price: self.price,
            area_sqft: self.area_sqft,
            address_line: self.address_line,
            city: self.city.trim().to_string(),
            state: self.state,
            pincode: self.pincode,
            image_url: self.image_url.filter(|u| !u.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
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
    /// Only present when the caller is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by_caller: Option<bool>,
}

impl ListingResponse {
    pub fn from_listing(listing: Listing, caller: Option<i64>) -> Self {
        Self {
            owned_by_caller: caller.map(|id| id == listing.owner_id),
            id: listing.id,
            owner_id: listing.owner_id,
            title: listing.title,
            description: listing.description,
            property_type: listing.property_type,
            price: listing.price,
            area_sqft: listing.area_sqft,
            address_line: listing.address_line,
            city: listing.city,
            state: listing.state,
            pincode: listing.pincode,
            image_url: listing.image_url,
            status: listing.status,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_and_status_in_body_are_ignored() {
        let req: CreateListingRequest = serde_json::from_value(json!({
            "title": "2BHK",
            "propertyType": "APARTMENT",
            "price": 5500000.0,
            "city": "Pune",
            "ownerId": 999,
            "status": "APPROVED"
        }))
        .unwrap();

        let new = req.validate().unwrap();
        assert_eq!(new.title, "2BHK");
        assert_eq!(new.city, "Pune");
    }

    #[test]
    fn validation_rejects_blank_and_negative_fields() {
        let base = json!({ "title": "t", "propertyType": "PLOT", "price": 1.0, "city": "c" });

        let mut blank = base.clone();
        blank["title"] = json!("  ");
        let req: CreateListingRequest = serde_json::from_value(blank).unwrap();
        assert!(req.validate().is_err());

        let mut negative = base.clone();
        negative["price"] = json!(-1.0);
        let req: CreateListingRequest = serde_json::from_value(negative).unwrap();
        assert!(req.validate().is_err());

        let mut area = base;
        area["areaSqft"] = json!(0.0);
        let req: CreateListingRequest = serde_json::from_value(area).unwrap();
        assert!(req.validate().is_err());
    }
}
