use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
    Default,
)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Open,
    Matched,
    Fulfilled,
    Cancelled,
}

/// An NGO's standing request for food of a given category.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FoodRequest {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub category: String,
    pub quantity: f64,
    pub needed_by: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFoodRequest {
    pub ngo_id: Uuid,
    pub category: String,
    pub quantity: f64,
    pub needed_by: Option<DateTime<Utc>>,
}

impl FoodRequest {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM food_requests WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>("SELECT * FROM food_requests ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM food_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ngo_id(
        pool: &SqlitePool,
        ngo_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM food_requests WHERE ngo_id = $1 ORDER BY created_at DESC",
        )
        .bind(ngo_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateFoodRequest) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO food_requests (id, ngo_id, category, quantity, needed_by)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.ngo_id)
        .bind(&data.category)
        .bind(data.quantity)
        .bind(data.needed_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE food_requests SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM food_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
