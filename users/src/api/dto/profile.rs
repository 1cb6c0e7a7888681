use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::address::{AddressRequest, AddressResponse};
use crate::repos::profile_repo::{Profile, ProfileUpdate, UNKNOWN_GENDER};

const GENDERS: [&str; 4] = ["MALE", "FEMALE", "OTHER", UNKNOWN_GENDER];

/// Body for `POST|PUT /users/profile`. A `userId` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub gender: Option<String>,
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileUpdate, String> {
        let gender = match self.gender.as_deref().map(str::trim) {
            None | Some("") => UNKNOWN_GENDER.to_string(),
            Some(g) => {
                let g = g.to_ascii_uppercase();
                if !GENDERS.contains(&g.as_str()) {
                    return Err(format!("gender must be one of {}", GENDERS.join(", ")));
                }
                g
            }
        };

        let phone = self.phone.trim().to_string();
        if !phone.chars().all(|c| c.is_ascii_digit() || "+- ".contains(c)) {
            return Err("phone may only contain digits, spaces, '+' and '-'".into());
        }

        Ok(ProfileUpdate {
            full_name: self.full_name.trim().to_string(),
            phone,
            gender,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: i64,
    pub full_name: String,
    pub phone: String,
    pub gender: String,
    /// `None` until the profile has been saved once.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileResponse {
    /// What a caller without a stored profile sees.
    pub fn empty(user_id: i64) -> Self {
        let blank = ProfileUpdate::default();
        Self {
            user_id,
            full_name: blank.full_name,
            phone: blank.phone,
            gender: blank.gender,
            updated_at: None,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name,
            phone: p.phone,
            gender: p.gender,
            updated_at: Some(p.updated_at),
        }
    }
}

/// Body for `POST|PUT /users/profile-full`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileFullRequest {
    pub profile: ProfileRequest,
    pub address: AddressRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFullResponse {
    pub profile: ProfileResponse,
    pub address: AddressResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provisioning_payload_is_accepted() {
        let req: ProfileRequest =
            serde_json::from_value(json!({ "fullName": "", "phone": "", "gender": "UNKNOWN" }))
                .unwrap();
        assert_eq!(req.validate().unwrap(), ProfileUpdate::default());
    }

    #[test]
    fn gender_is_normalised_and_checked() {
        let req = ProfileRequest {
            gender: Some("female".into()),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap().gender, "FEMALE");

        let req = ProfileRequest {
            gender: Some("robot".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn phone_rejects_letters() {
        let req = ProfileRequest {
            phone: "call me".into(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
