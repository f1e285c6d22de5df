use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Ngo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub capacity: Option<i64>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateNgo {
    pub user_id: Uuid,
    pub organization: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateNgo {
    pub organization: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub capacity: Option<i64>,
}

impl Ngo {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ngos ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ngos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM ngos WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateNgo) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO ngos (id, user_id, organization, address, latitude, longitude, phone, capacity)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.user_id)
        .bind(&data.organization)
        .bind(&data.address)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.phone)
        .bind(data.capacity)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateNgo,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE ngos
               SET organization = COALESCE($2, organization),
                   address = COALESCE($3, address),
                   latitude = COALESCE($4, latitude),
                   longitude = COALESCE($5, longitude),
                   phone = COALESCE($6, phone),
                   capacity = COALESCE($7, capacity),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.organization)
        .bind(&data.address)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.phone)
        .bind(data.capacity)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_verified(
        pool: &SqlitePool,
        id: Uuid,
        verified: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE ngos
               SET verified = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(verified)
        .fetch_optional(pool)
        .await
    }
}
