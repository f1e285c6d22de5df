//! Background service that retires food listings whose expiry time has
//! passed.

use std::time::Duration;

use chrono::Utc;
use db::{
    DBService,
    models::{food_item::FoodItem, session::Session},
};
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum ExpiryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service that sweeps available food items past their expiry
/// and marks them `Expired`, and drops expired sessions along the way.
pub struct FoodExpiryService {
    db: DBService,
    poll_interval: Duration,
}

impl FoodExpiryService {
    const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

    /// Spawn the background expiry sweep
    pub async fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting food expiry service with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.sweep().await {
                error!("Error expiring food items: {}", e);
            }
        }
    }

    async fn sweep(&self) -> Result<(), ExpiryError> {
        let expired = FoodItem::mark_expired(&self.db.pool).await?;
        if expired > 0 {
            info!(count = expired, "Marked food items as expired");
        } else {
            debug!("Food expiry: nothing to expire");
        }

        let dropped = Session::delete_expired(&self.db.pool, Utc::now()).await?;
        if dropped > 0 {
            info!(count = dropped, "Removed expired sessions");
        }
        Ok(())
    }
}
