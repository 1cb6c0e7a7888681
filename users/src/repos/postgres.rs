use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::repos::error::RepoResult;
use crate::repos::profile_repo::{Address, NewAddress, Profile, ProfileRepo, ProfileUpdate};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    full_name: String,
    phone: String,
    gender: String,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            full_name: row.full_name,
            phone: row.phone,
            gender: row.gender,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct AddressRow {
    id: i64,
    user_id: i64,
    address_line: String,
    city: String,
    state: String,
    pincode: String,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            user_id: row.user_id,
            address_line: row.address_line,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            created_at: row.created_at,
        }
    }
}

const UPSERT_PROFILE: &str = r#"
    INSERT INTO profiles (user_id, full_name, phone, gender)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id) DO UPDATE
    SET full_name = EXCLUDED.full_name,
        phone = EXCLUDED.phone,
        gender = EXCLUDED.gender,
        updated_at = now()
    RETURNING user_id, full_name, phone, gender, updated_at
"#;

const INSERT_ADDRESS: &str = r#"
    INSERT INTO addresses (user_id, address_line, city, state, pincode)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, user_id, address_line, city, state, pincode, created_at
"#;

#[derive(Clone, Debug)]
pub struct PgProfileRepo {
    pool: PgPool,
}

impl PgProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn upsert_in(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> RepoResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(UPSERT_PROFILE)
            .bind(user_id)
            .bind(&update.full_name)
            .bind(&update.phone)
            .bind(&update.gender)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.into())
    }

    async fn insert_address_in(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        new: &NewAddress,
    ) -> RepoResult<Address> {
        let row = sqlx::query_as::<_, AddressRow>(INSERT_ADDRESS)
            .bind(user_id)
            .bind(&new.address_line)
            .bind(&new.city)
            .bind(&new.state)
            .bind(&new.pincode)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn upsert_profile(&self, user_id: i64, update: ProfileUpdate) -> RepoResult<Profile> {
        let mut tx = self.pool.begin().await?;
        let profile = Self::upsert_in(&mut tx, user_id, &update).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn find_profile(&self, user_id: i64) -> RepoResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, full_name, phone, gender, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn add_address(&self, user_id: i64, new: NewAddress) -> RepoResult<Address> {
        let mut tx = self.pool.begin().await?;
        let address = Self::insert_address_in(&mut tx, user_id, &new).await?;
        tx.commit().await?;
        Ok(address)
    }

    async fn list_addresses(&self, user_id: i64) -> RepoResult<Vec<Address>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT id, user_id, address_line, city, state, pincode, created_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn save_profile_and_address(
        &self,
        user_id: i64,
        update: ProfileUpdate,
        new: NewAddress,
    ) -> RepoResult<(Profile, Address)> {
        let mut tx = self.pool.begin().await?;
        let profile = Self::upsert_in(&mut tx, user_id, &update).await?;
        let address = Self::insert_address_in(&mut tx, user_id, &new).await?;
        tx.commit().await?;
        Ok((profile, address))
    }
}
