use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::profile_repo::{Address, NewAddress};

/// Body for `POST /users/address`. A `userId` in the body is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub address_line: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

impl AddressRequest {
    pub fn validate(self) -> Result<NewAddress, String> {
        if self.address_line.trim().is_empty() {
            return Err("addressLine must not be empty".into());
        }
        if self.city.trim().is_empty() {
            return Err("city must not be empty".into());
        }
        let pincode = self.pincode.trim().to_string();
        if !pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err("pincode must be numeric".into());
        }

        Ok(NewAddress {
            address_line: self.address_line.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: i64,
    pub user_id: i64,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            address_line: a.address_line,
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            created_at: a.created_at,
        }
    }
}
