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
#[sqlx(type_name = "food_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FoodStatus {
    #[default]
    Available,
    Reserved,
    Collected,
    Expired,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FoodItem {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: FoodStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFoodItem {
    pub donor_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateFoodItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// An available food item joined with its donor's coordinates, for match
/// scoring.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
pub struct FoodItemWithLocation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: FoodItem,
    pub donor_latitude: Option<f64>,
    pub donor_longitude: Option<f64>,
}

impl FoodItem {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<FoodStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Self>(
                    "SELECT * FROM food_items WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>("SELECT * FROM food_items ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM food_items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_donor_id(
        pool: &SqlitePool,
        donor_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM food_items WHERE donor_id = $1 ORDER BY created_at DESC",
        )
        .bind(donor_id)
        .fetch_all(pool)
        .await
    }

    /// Available items with donor coordinates, freshest first. Candidate set
    /// for match scoring.
    pub async fn find_available_with_location(
        pool: &SqlitePool,
    ) -> Result<Vec<FoodItemWithLocation>, sqlx::Error> {
        sqlx::query_as::<_, FoodItemWithLocation>(
            r#"SELECT f.*, d.latitude AS donor_latitude, d.longitude AS donor_longitude
               FROM food_items f
               JOIN donors d ON d.id = f.donor_id
               WHERE f.status = 'available'
               ORDER BY f.created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateFoodItem) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let unit = data.unit.clone().unwrap_or_else(|| "kg".to_string());
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO food_items (id, donor_id, title, description, category, quantity, unit, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.donor_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.quantity)
        .bind(unit)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateFoodItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE food_items
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   category = COALESCE($4, category),
                   quantity = COALESCE($5, quantity),
                   unit = COALESCE($6, unit),
                   expires_at = COALESCE($7, expires_at),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.quantity)
        .bind(&data.unit)
        .bind(data.expires_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: FoodStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE food_items SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Flip available items whose expiry has passed to `Expired`. Returns the
    /// number of rows changed.
    pub async fn mark_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE food_items
               SET status = 'expired', updated_at = CURRENT_TIMESTAMP
               WHERE status = 'available'
                 AND expires_at IS NOT NULL
                 AND datetime(expires_at) < datetime('now')"#,
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        DBService,
        models::{donor::CreateDonor, user::{Role, User}},
    };

    async fn seed_donor(db: &DBService) -> Uuid {
        let user = User::create(
            &db.pool,
            Uuid::new_v4(),
            "Dana",
            "dana@example.com",
            "x",
            Role::Donor,
        )
        .await
        .unwrap();
        let donor = crate::models::donor::Donor::create(
            &db.pool,
            &CreateDonor {
                user_id: user.id,
                organization: Some("Dana's Bakery".to_string()),
                address: None,
                latitude: None,
                longitude: None,
                phone: None,
            },
        )
        .await
        .unwrap();
        donor.id
    }

    fn item(donor_id: Uuid, title: &str, expires_at: Option<DateTime<Utc>>) -> CreateFoodItem {
        CreateFoodItem {
            donor_id,
            title: title.to_string(),
            description: None,
            category: "bread".to_string(),
            quantity: 4.0,
            unit: None,
            expires_at,
        }
    }

    #[tokio::test]
    async fn create_and_filter_by_status() {
        let db = DBService::new_in_memory().await.unwrap();
        let donor_id = seed_donor(&db).await;

        let created = FoodItem::create(&db.pool, &item(donor_id, "Rolls", None))
            .await
            .unwrap();
        assert_eq!(created.status, FoodStatus::Available);
        assert_eq!(created.unit, "kg");

        FoodItem::update_status(&db.pool, created.id, FoodStatus::Reserved)
            .await
            .unwrap();

        let available = FoodItem::find_all(&db.pool, Some(FoodStatus::Available))
            .await
            .unwrap();
        assert!(available.is_empty());

        let reserved = FoodItem::find_all(&db.pool, Some(FoodStatus::Reserved))
            .await
            .unwrap();
        assert_eq!(reserved.len(), 1);
        assert_eq!(reserved[0].id, created.id);
    }

    #[tokio::test]
    async fn mark_expired_only_touches_stale_available_items() {
        let db = DBService::new_in_memory().await.unwrap();
        let donor_id = seed_donor(&db).await;

        let stale = FoodItem::create(
            &db.pool,
            &item(donor_id, "Old", Some(Utc::now() - Duration::hours(2))),
        )
        .await
        .unwrap();
        let fresh = FoodItem::create(
            &db.pool,
            &item(donor_id, "Fresh", Some(Utc::now() + Duration::hours(2))),
        )
        .await
        .unwrap();

        let changed = FoodItem::mark_expired(&db.pool).await.unwrap();
        assert_eq!(changed, 1);

        let stale = FoodItem::find_by_id(&db.pool, stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, FoodStatus::Expired);
        let fresh = FoodItem::find_by_id(&db.pool, fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh.status, FoodStatus::Available);
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = DBService::new_in_memory().await.unwrap();
        let donor_id = seed_donor(&db).await;
        let created = FoodItem::create(&db.pool, &item(donor_id, "Rolls", None))
            .await
            .unwrap();

        assert_eq!(FoodItem::delete(&db.pool, created.id).await.unwrap(), 1);
        assert_eq!(FoodItem::delete(&db.pool, created.id).await.unwrap(), 0);
    }
}
