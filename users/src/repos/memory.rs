use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoResult;
use crate::repos::profile_repo::{Address, NewAddress, Profile, ProfileRepo, ProfileUpdate};

#[derive(Debug, Default)]
struct Store {
    profiles: HashMap<i64, Profile>,
    addresses: Vec<Address>,
}

impl Store {
    fn upsert(&mut self, user_id: i64, update: ProfileUpdate) -> Profile {
        let profile = Profile {
            user_id,
            full_name: update.full_name,
            phone: update.phone,
            gender: update.gender,
            updated_at: Utc::now(),
        };
        self.profiles.insert(user_id, profile.clone());
        profile
    }

    fn push_address(&mut self, user_id: i64, new: NewAddress) -> Address {
        let address = Address {
            id: self.addresses.len() as i64 + 1,
            user_id,
            address_line: new.address_line,
            city: new.city,
            state: new.state,
            pincode: new.pincode,
            created_at: Utc::now(),
        };
        self.addresses.push(address.clone());
        address
    }
}

/// Process-local store used when no DATABASE_URL is configured.
#[derive(Debug, Default)]
pub struct MemoryProfileRepo {
    store: RwLock<Store>,
}

impl MemoryProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepo for MemoryProfileRepo {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_profile(&self, user_id: i64, update: ProfileUpdate) -> RepoResult<Profile> {
        Ok(self.store.write().await.upsert(user_id, update))
    }

    async fn find_profile(&self, user_id: i64) -> RepoResult<Option<Profile>> {
        Ok(self.store.read().await.profiles.get(&user_id).cloned())
    }

    async fn add_address(&self, user_id: i64, new: NewAddress) -> RepoResult<Address> {
        Ok(self.store.write().await.push_address(user_id, new))
    }

    async fn list_addresses(&self, user_id: i64) -> RepoResult<Vec<Address>> {
        let store = self.store.read().await;
        Ok(store
            .addresses
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_profile_and_address(
        &self,
        user_id: i64,
        update: ProfileUpdate,
        new: NewAddress,
    ) -> RepoResult<(Profile, Address)> {
        // Single write guard: both land together
        let mut store = self.store.write().await;
        let profile = store.upsert(user_id, update);
        let address = store.push_address(user_id, new);
        Ok((profile, address))
    }
}
