use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    donor::{CreateDonor, Donor, UpdateDonor},
    food_item::FoodItem,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

/// GET /api/donors
pub async fn list_donors(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Donor>>>, ApiError> {
    let donors = Donor::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(donors)))
}

/// GET /api/donors/{donor_id}
pub async fn get_donor(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(donor_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Donor>>, ApiError> {
    let donor = Donor::find_by_id(&state.db().pool, donor_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(donor)))
}

/// GET /api/donors/{donor_id}/food-items
pub async fn list_donor_food_items(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(donor_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<FoodItem>>>, ApiError> {
    Donor::find_by_id(&state.db().pool, donor_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let items = FoodItem::find_by_donor_id(&state.db().pool, donor_id).await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// POST /api/donors
pub async fn create_donor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(mut payload): axum::Json<CreateDonor>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Donor>>), ApiError> {
    // A donor profile always belongs to the caller.
    payload.user_id = user.user_id;
    let donor = Donor::create(&state.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(donor)),
    ))
}

/// PUT /api/donors/{donor_id}
pub async fn update_donor(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(donor_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateDonor>,
) -> Result<ResponseJson<ApiResponse<Donor>>, ApiError> {
    let donor = Donor::update(&state.db().pool, donor_id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(donor)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/donors",
        Router::new()
            .route("/", get(list_donors).post(create_donor))
            .route("/{donor_id}", get(get_donor).put(update_donor))
            .route("/{donor_id}/food-items", get(list_donor_food_items)),
    )
}
