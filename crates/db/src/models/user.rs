use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Account-level role. Exactly one per user, immutable for the lifetime of a
/// session. `Unknown` is the deserialization fallback for role strings this
/// build does not recognize; it is never written to the database.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
    Default,
)]
#[sqlx(type_name = "role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Donor,
    Receiver,
    Ngo,
    Admin,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a role string, degrading to `Unknown` instead of failing.
    pub fn parse_or_unknown(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

impl User {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO users (id, name, email, password_hash, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::parse_or_unknown("donor"), Role::Donor);
        assert_eq!(Role::parse_or_unknown("Admin"), Role::Admin);
        assert_eq!(Role::Ngo.to_string(), "ngo");
    }

    #[test]
    fn unrecognized_role_degrades_to_unknown() {
        assert_eq!(Role::parse_or_unknown("superuser"), Role::Unknown);
        assert_eq!(Role::parse_or_unknown(""), Role::Unknown);
    }

    #[test]
    fn unknown_role_deserializes_from_json() {
        let role: Role = serde_json::from_str("\"volunteer\"").unwrap();
        assert_eq!(role, Role::Unknown);
    }
}
