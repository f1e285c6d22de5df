use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Feedback {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub author_user_id: Uuid,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFeedback {
    pub transaction_id: Uuid,
    pub rating: i64,
    pub comment: Option<String>,
}

impl Feedback {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM feedback ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM feedback WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_transaction_id(
        pool: &SqlitePool,
        transaction_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM feedback WHERE transaction_id = $1 ORDER BY created_at DESC",
        )
        .bind(transaction_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        author_user_id: Uuid,
        data: &CreateFeedback,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO feedback (id, transaction_id, author_user_id, rating, comment)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.transaction_id)
        .bind(author_user_id)
        .bind(data.rating)
        .bind(&data.comment)
        .fetch_one(pool)
        .await
    }

    /// Mean rating across all feedback left on a donor's transactions.
    pub async fn average_rating_for_donor(
        pool: &SqlitePool,
        donor_id: Uuid,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            r#"SELECT AVG(f.rating)
               FROM feedback f
               JOIN transactions t ON t.id = f.transaction_id
               WHERE t.donor_id = $1"#,
        )
        .bind(donor_id)
        .fetch_one(pool)
        .await
    }
}
