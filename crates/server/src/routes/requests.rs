use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    food_request::{CreateFoodRequest, FoodRequest, RequestStatus},
    ngo::Ngo,
};
use serde::Deserialize;
use services::services::{
    auth::AuthError,
    matching::{MatchingService, ScoredMatch},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}

/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<RequestQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<FoodRequest>>>, ApiError> {
    let requests = FoodRequest::find_all(&state.db().pool, query.status).await?;
    Ok(ResponseJson(ApiResponse::success(requests)))
}

/// GET /api/requests/{request_id}
pub async fn get_request(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FoodRequest>>, ApiError> {
    let request = FoodRequest::find_by_id(&state.db().pool, request_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(mut payload): axum::Json<CreateFoodRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<FoodRequest>>), ApiError> {
    if payload.quantity <= 0.0 {
        return Err(ApiError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }
    let ngo = Ngo::find_by_user_id(&state.db().pool, user.user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;
    payload.ngo_id = ngo.id;
    let request = FoodRequest::create(&state.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(request)),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
}

/// PUT /api/requests/{request_id}/status
pub async fn update_request_status(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(request_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateRequestStatus>,
) -> Result<ResponseJson<ApiResponse<FoodRequest>>, ApiError> {
    FoodRequest::find_by_id(&state.db().pool, request_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    FoodRequest::update_status(&state.db().pool, request_id, payload.status).await?;
    let request = FoodRequest::find_by_id(&state.db().pool, request_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

/// GET /api/requests/{request_id}/matches
///
/// Available food items ranked against this request, best match first.
pub async fn list_matches(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ScoredMatch>>>, ApiError> {
    let matches = MatchingService::new(state.db().pool.clone())
        .find_matches(request_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(matches)))
}

/// DELETE /api/requests/{request_id}
pub async fn delete_request(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = FoodRequest::delete(&state.db().pool, request_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/requests",
        Router::new()
            .route("/", get(list_requests).post(create_request))
            .route("/{request_id}", get(get_request).delete(delete_request))
            .route("/{request_id}/status", axum::routing::put(update_request_status))
            .route("/{request_id}/matches", get(list_matches)),
    )
}
