use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::user::Role;
use services::services::{
    analytics::{AnalyticsService, DashboardSummary},
    auth::AuthError,
};
use utils::response::ApiResponse;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

/// GET /api/analytics/summary
///
/// Role-aware dashboard numbers for the caller.
pub async fn summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    let summary = AnalyticsService::new(state.db().pool.clone())
        .summary_for(&user)
        .await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

/// GET /api/analytics/platform
///
/// Platform-wide totals. Admin only.
pub async fn platform(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    if user.role != Role::Admin {
        return Err(AuthError::Unauthorized.into());
    }
    let summary = AnalyticsService::new(state.db().pool.clone())
        .summary_for(&user)
        .await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/analytics",
        Router::new()
            .route("/summary", get(summary))
            .route("/platform", get(platform)),
    )
}
