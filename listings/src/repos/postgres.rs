use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::listing_repo::{Listing, ListingFilter, ListingRepo, ListingStatus, NewListing};

const COLUMNS: &str = r#"
    id, owner_id, title, description, property_type, price, area_sqft,
    address_line, city, state, pincode, image_url, status, created_at, updated_at
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    owner_id: i64,
    title: String,
    description: String,
    property_type: String,
    price: f64,
    area_sqft: Option<f64>,
    address_line: String,
    city: String,
    state: String,
    pincode: String,
    image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepoError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ListingStatus>()
            .map_err(RepoError::Corrupt)?;

        Ok(Listing {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            property_type: row.property_type,
            price: row.price,
            area_sqft: row.area_sqft,
            address_line: row.address_line,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            image_url: row.image_url,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgListingRepo {
    pool: PgPool,
}

impl PgListingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ListingRepo for PgListingRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, owner_id: i64, new: NewListing) -> RepoResult<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings (
                owner_id, title, description, property_type, price, area_sqft,
                address_line, city, state, pincode, image_url, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'PENDING')
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.property_type)
            .bind(new.price)
            .bind(new.area_sqft)
            .bind(&new.address_line)
            .bind(&new.city)
            .bind(&new.state)
            .bind(&new.pincode)
            .bind(&new.image_url)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Listing>> {
        let sql = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Listing::try_from).transpose()
    }

    async fn search(&self, filter: &ListingFilter) -> RepoResult<Vec<Listing>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM listings
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR owner_id = $2)
              AND ($3::text IS NULL OR lower(city) = lower($3))
              AND ($4::text IS NULL OR lower(property_type) = lower($4))
              AND ($5::float8 IS NULL OR price >= $5)
              AND ($6::float8 IS NULL OR price <= $6)
            ORDER BY id DESC
            LIMIT $7 OFFSET $8
            "#
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.owner_id)
            .bind(filter.city.as_deref())
            .bind(filter.property_type.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn update_status(
        &self,
        id: i64,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> RepoResult<Listing> {
        let sql = format!(
            r#"
            UPDATE listings
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => match self.get(id).await? {
                Some(current) => Err(RepoError::Conflict(format!(
                    "listing is {}, expected {}",
                    current.status, expected
                ))),
                None => Err(RepoError::NotFound),
            },
        }
    }
}
