//! Session-token authentication over the users and sessions tables.

use chrono::{Duration, Utc};
use db::models::{
    session::Session,
    user::{CreateUser, Role, User},
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing or expired session")]
    Unauthorized,
    #[error("email already registered")]
    EmailTaken,
    #[error("unrecognized role")]
    InvalidRole,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

pub struct AuthService {
    pool: SqlitePool,
}

impl AuthService {
    const SESSION_TTL_HOURS: i64 = 24 * 7;

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, data: &CreateUser) -> Result<User, AuthError> {
        // Unknown is a deserialization fallback, never a stored role.
        if data.role == Some(Role::Unknown) {
            return Err(AuthError::InvalidRole);
        }
        if User::find_by_email(&self.pool, &data.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        let role = data.role.unwrap_or_default();
        let user = User::create(
            &self.pool,
            Uuid::new_v4(),
            &data.name,
            &data.email,
            &hash_password(&data.password),
            role,
        )
        .await?;
        info!(user_id = %user.id, role = %role, "registered user");
        Ok(user)
    }

    /// Verify credentials and issue a fresh session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Session, User), AuthError> {
        let user = User::find_by_email(&self.pool, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::hours(Self::SESSION_TTL_HOURS);
        let session = Session::create(&self.pool, user.id, &token, expires_at).await?;
        info!(user_id = %user.id, "issued session");
        Ok((session, user))
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        Session::delete_by_token(&self.pool, token).await?;
        Ok(())
    }

    /// Resolve a bearer token to its user. Expired sessions are removed on
    /// sight rather than waiting for a sweep.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let session = Session::find_by_token(&self.pool, token)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if session.is_expired(Utc::now()) {
            Session::delete_by_token(&self.pool, token).await?;
            return Err(AuthError::Unauthorized);
        }
        let user = User::find_by_id(&self.pool, session.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        Ok(AuthUser {
            user_id: user.id,
            name: user.name,
            role: user.role,
        })
    }
}

/// Salted SHA-256, stored as `salt$digest` in hex.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = Sha256::digest([&salt[..], password.as_bytes()].concat());
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let digest = Sha256::digest([&salt[..], password.as_bytes()].concat());
    hex::encode(digest) == digest_hex
}

#[cfg(test)]
mod tests {
    use db::DBService;

    use super::*;

    fn signup(name: &str, email: &str, role: Role) -> CreateUser {
        CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            role: Some(role),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert!(!verify_password("hunter2", "garbage"));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[tokio::test]
    async fn register_login_authenticate_logout() {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.pool.clone());

        let user = auth
            .register(&signup("Nadia", "nadia@example.com", Role::Ngo))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Ngo);

        let (session, _) = auth.login("nadia@example.com", "hunter2").await.unwrap();
        let who = auth.authenticate(&session.token).await.unwrap();
        assert_eq!(who.user_id, user.id);
        assert_eq!(who.role, Role::Ngo);

        auth.logout(&session.token).await.unwrap();
        assert!(matches!(
            auth.authenticate(&session.token).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn unrecognized_role_never_reaches_the_database() {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.pool.clone());

        assert!(matches!(
            auth.register(&signup("V", "volunteer@example.com", Role::Unknown))
                .await,
            Err(AuthError::InvalidRole)
        ));
        assert!(
            User::find_by_email(&db.pool, "volunteer@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.pool.clone());

        auth.register(&signup("A", "dup@example.com", Role::Donor))
            .await
            .unwrap();
        assert!(matches!(
            auth.register(&signup("B", "dup@example.com", Role::Donor))
                .await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.pool.clone());
        auth.register(&signup("A", "a@example.com", Role::Donor))
            .await
            .unwrap();

        assert!(matches!(
            auth.login("a@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized_and_removed() {
        let db = DBService::new_in_memory().await.unwrap();
        let auth = AuthService::new(db.pool.clone());
        let user = auth
            .register(&signup("A", "a@example.com", Role::Donor))
            .await
            .unwrap();

        let stale =
            Session::create(&db.pool, user.id, "stale-token", Utc::now() - Duration::hours(1))
                .await
                .unwrap();
        assert!(matches!(
            auth.authenticate(&stale.token).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(Session::find_by_token(&db.pool, "stale-token")
            .await
            .unwrap()
            .is_none());
    }
}
