//! Dashboard aggregation queries. Everything here is read-only.

use serde::Serialize;
use sqlx::SqlitePool;
use ts_rs::TS;
use uuid::Uuid;

use crate::models::feedback::Feedback;

/// Platform-wide totals, shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, TS)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_donors: i64,
    pub total_ngos: i64,
    pub total_food_items: i64,
    pub available_food_items: i64,
    pub total_transactions: i64,
    pub completed_transactions: i64,
    pub total_donated_quantity: f64,
}

/// A single donor's dashboard numbers.
#[derive(Debug, Clone, Serialize, TS)]
pub struct DonorStats {
    pub donor_id: Uuid,
    pub total_food_items: i64,
    pub available_food_items: i64,
    pub total_transactions: i64,
    pub completed_transactions: i64,
    pub total_donated_quantity: f64,
    pub average_rating: Option<f64>,
}

/// A single NGO's dashboard numbers.
#[derive(Debug, Clone, Serialize, TS)]
pub struct NgoStats {
    pub ngo_id: Uuid,
    pub open_requests: i64,
    pub total_transactions: i64,
    pub completed_transactions: i64,
    pub total_received_quantity: f64,
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await
}

async fn count_for(pool: &SqlitePool, sql: &str, id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(id)
        .fetch_one(pool)
        .await
}

impl PlatformStats {
    pub async fn load(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let total_donated_quantity = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT SUM(quantity) FROM transactions WHERE status = 'completed'",
        )
        .fetch_one(pool)
        .await?
        .unwrap_or(0.0);

        Ok(Self {
            total_users: count(pool, "SELECT COUNT(*) FROM users").await?,
            total_donors: count(pool, "SELECT COUNT(*) FROM donors").await?,
            total_ngos: count(pool, "SELECT COUNT(*) FROM ngos").await?,
            total_food_items: count(pool, "SELECT COUNT(*) FROM food_items").await?,
            available_food_items: count(
                pool,
                "SELECT COUNT(*) FROM food_items WHERE status = 'available'",
            )
            .await?,
            total_transactions: count(pool, "SELECT COUNT(*) FROM transactions").await?,
            completed_transactions: count(
                pool,
                "SELECT COUNT(*) FROM transactions WHERE status = 'completed'",
            )
            .await?,
            total_donated_quantity,
        })
    }
}

impl DonorStats {
    pub async fn load(pool: &SqlitePool, donor_id: Uuid) -> Result<Self, sqlx::Error> {
        let total_donated_quantity = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT SUM(quantity) FROM transactions WHERE donor_id = $1 AND status = 'completed'",
        )
        .bind(donor_id)
        .fetch_one(pool)
        .await?
        .unwrap_or(0.0);

        let average_rating = Feedback::average_rating_for_donor(pool, donor_id).await?;

        Ok(Self {
            donor_id,
            total_food_items: count_for(
                pool,
                "SELECT COUNT(*) FROM food_items WHERE donor_id = $1",
                donor_id,
            )
            .await?,
            available_food_items: count_for(
                pool,
                "SELECT COUNT(*) FROM food_items WHERE donor_id = $1 AND status = 'available'",
                donor_id,
            )
            .await?,
            total_transactions: count_for(
                pool,
                "SELECT COUNT(*) FROM transactions WHERE donor_id = $1",
                donor_id,
            )
            .await?,
            completed_transactions: count_for(
                pool,
                "SELECT COUNT(*) FROM transactions WHERE donor_id = $1 AND status = 'completed'",
                donor_id,
            )
            .await?,
            total_donated_quantity,
            average_rating,
        })
    }
}

impl NgoStats {
    pub async fn load(pool: &SqlitePool, ngo_id: Uuid) -> Result<Self, sqlx::Error> {
        let total_received_quantity = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT SUM(quantity) FROM transactions WHERE ngo_id = $1 AND status = 'completed'",
        )
        .bind(ngo_id)
        .fetch_one(pool)
        .await?
        .unwrap_or(0.0);

        Ok(Self {
            ngo_id,
            open_requests: count_for(
                pool,
                "SELECT COUNT(*) FROM food_requests WHERE ngo_id = $1 AND status = 'open'",
                ngo_id,
            )
            .await?,
            total_transactions: count_for(
                pool,
                "SELECT COUNT(*) FROM transactions WHERE ngo_id = $1",
                ngo_id,
            )
            .await?,
            completed_transactions: count_for(
                pool,
                "SELECT COUNT(*) FROM transactions WHERE ngo_id = $1 AND status = 'completed'",
                ngo_id,
            )
            .await?,
            total_received_quantity,
        })
    }
}
