//! Role-aware dashboard summaries.

use db::models::{
    analytics::{DonorStats, NgoStats, PlatformStats},
    donor::Donor,
    ngo::Ngo,
    user::Role,
};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;

use crate::services::auth::AuthUser;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("no profile found for this account")]
    ProfileNotFound,
    #[error("no dashboard for this role")]
    NoDashboard,
}

/// What the dashboard shows depends on who is asking.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardSummary {
    Platform(PlatformStats),
    Donor(DonorStats),
    Ngo(NgoStats),
}

pub struct AnalyticsService {
    pool: SqlitePool,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build the dashboard summary for the given user.
    ///
    /// Admins see platform totals; donors and NGOs see their own numbers.
    pub async fn summary_for(&self, user: &AuthUser) -> Result<DashboardSummary, AnalyticsError> {
        match user.role {
            Role::Admin => {
                let stats = PlatformStats::load(&self.pool).await?;
                Ok(DashboardSummary::Platform(stats))
            }
            Role::Donor => {
                let donor = Donor::find_by_user_id(&self.pool, user.user_id)
                    .await?
                    .ok_or(AnalyticsError::ProfileNotFound)?;
                let stats = DonorStats::load(&self.pool, donor.id).await?;
                Ok(DashboardSummary::Donor(stats))
            }
            Role::Receiver | Role::Ngo => {
                let ngo = Ngo::find_by_user_id(&self.pool, user.user_id)
                    .await?
                    .ok_or(AnalyticsError::ProfileNotFound)?;
                let stats = NgoStats::load(&self.pool, ngo.id).await?;
                Ok(DashboardSummary::Ngo(stats))
            }
            Role::Unknown => Err(AnalyticsError::NoDashboard),
        }
    }
}
