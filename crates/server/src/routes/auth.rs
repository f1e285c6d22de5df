use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use db::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use services::services::auth::AuthService;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    let user = AuthService::new(state.db().pool.clone())
        .register(&payload)
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(user))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let (session, user) = AuthService::new(state.db().pool.clone())
        .login(&payload.email, &payload.password)
        .await?;
    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    headers: axum::http::HeaderMap,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        AuthService::new(state.db().pool.clone()).logout(token).await?;
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// DELETE /api/auth/me
///
/// Deletes the caller's account; sessions go with it via cascade.
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = User::delete(&state.db().pool, user.user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(&state.db().pool, user.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/me", get(me).delete(delete_me)),
    )
}
