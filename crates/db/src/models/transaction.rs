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
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A donation handoff: a food item promised by a donor to an NGO.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Transaction {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub donor_id: Uuid,
    pub ngo_id: Uuid,
    pub quantity: f64,
    pub status: TransactionStatus,
    pub scheduled_pickup: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTransaction {
    pub food_item_id: Uuid,
    pub ngo_id: Uuid,
    pub quantity: f64,
    pub scheduled_pickup: Option<DateTime<Utc>>,
}

/// Optional filters for transaction listings. All of them AND together.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct TransactionFilter {
    pub donor_id: Option<Uuid>,
    pub ngo_id: Option<Uuid>,
    pub food_item_id: Option<Uuid>,
    pub status: Option<TransactionStatus>,
}

impl Transaction {
    pub async fn find_all(
        pool: &SqlitePool,
        filter: &TransactionFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT * FROM transactions
               WHERE ($1 IS NULL OR donor_id = $1)
                 AND ($2 IS NULL OR ngo_id = $2)
                 AND ($3 IS NULL OR food_item_id = $3)
                 AND ($4 IS NULL OR status = $4)
               ORDER BY created_at DESC"#,
        )
        .bind(filter.donor_id)
        .bind(filter.ngo_id)
        .bind(filter.food_item_id)
        .bind(filter.status)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        donor_id: Uuid,
        data: &CreateTransaction,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO transactions (id, food_item_id, donor_id, ngo_id, quantity, scheduled_pickup)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.food_item_id)
        .bind(donor_id)
        .bind(data.ngo_id)
        .bind(data.quantity)
        .bind(data.scheduled_pickup)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE transactions
               SET status = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }
}
