use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    food_request::FoodRequest,
    ngo::{CreateNgo, Ngo, UpdateNgo},
    user::Role,
};
use services::services::auth::AuthError;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

/// GET /api/ngos
pub async fn list_ngos(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Ngo>>>, ApiError> {
    let ngos = Ngo::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(ngos)))
}

/// GET /api/ngos/{ngo_id}
pub async fn get_ngo(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(ngo_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Ngo>>, ApiError> {
    let ngo = Ngo::find_by_id(&state.db().pool, ngo_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(ngo)))
}

/// POST /api/ngos
pub async fn create_ngo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(mut payload): axum::Json<CreateNgo>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Ngo>>), ApiError> {
    payload.user_id = user.user_id;
    let ngo = Ngo::create(&state.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(ngo))))
}

/// PUT /api/ngos/{ngo_id}
pub async fn update_ngo(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(ngo_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateNgo>,
) -> Result<ResponseJson<ApiResponse<Ngo>>, ApiError> {
    let ngo = Ngo::update(&state.db().pool, ngo_id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(ngo)))
}

/// GET /api/ngos/{ngo_id}/requests
pub async fn list_ngo_requests(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(ngo_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<FoodRequest>>>, ApiError> {
    Ngo::find_by_id(&state.db().pool, ngo_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let requests = FoodRequest::find_by_ngo_id(&state.db().pool, ngo_id).await?;
    Ok(ResponseJson(ApiResponse::success(requests)))
}

/// POST /api/ngos/{ngo_id}/verify
///
/// Admin only. Marks the NGO as verified.
pub async fn verify_ngo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ngo_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Ngo>>, ApiError> {
    if user.role != Role::Admin {
        return Err(AuthError::Unauthorized.into());
    }
    let ngo = Ngo::set_verified(&state.db().pool, ngo_id, true)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(ngo)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/ngos",
        Router::new()
            .route("/", get(list_ngos).post(create_ngo))
            .route("/{ngo_id}", get(get_ngo).put(update_ngo))
            .route("/{ngo_id}/requests", get(list_ngo_requests))
            .route("/{ngo_id}/verify", post(verify_ngo)),
    )
}
