use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    donor::Donor,
    food_item::{CreateFoodItem, FoodItem, FoodStatus, UpdateFoodItem},
};
use serde::Deserialize;
use services::services::auth::AuthError;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FoodItemQuery {
    pub status: Option<FoodStatus>,
}

/// GET /api/food-items
pub async fn list_food_items(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<FoodItemQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<FoodItem>>>, ApiError> {
    let items = FoodItem::find_all(&state.db().pool, query.status).await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// GET /api/food-items/{item_id}
pub async fn get_food_item(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FoodItem>>, ApiError> {
    let item = FoodItem::find_by_id(&state.db().pool, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// POST /api/food-items
///
/// The item is listed under the caller's donor profile, ignoring any
/// donor_id in the payload.
pub async fn create_food_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(mut payload): axum::Json<CreateFoodItem>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<FoodItem>>), ApiError> {
    if payload.quantity <= 0.0 {
        return Err(ApiError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }
    let donor = Donor::find_by_user_id(&state.db().pool, user.user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;
    payload.donor_id = donor.id;
    let item = FoodItem::create(&state.db().pool, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(item)),
    ))
}

/// PUT /api/food-items/{item_id}
pub async fn update_food_item(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(item_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateFoodItem>,
) -> Result<ResponseJson<ApiResponse<FoodItem>>, ApiError> {
    if matches!(payload.quantity, Some(q) if q <= 0.0) {
        return Err(ApiError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }
    let item = FoodItem::update(&state.db().pool, item_id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/food-items/{item_id}
pub async fn delete_food_item(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = FoodItem::delete(&state.db().pool, item_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/food-items",
        Router::new()
            .route("/", get(list_food_items).post(create_food_item))
            .route(
                "/{item_id}",
                get(get_food_item)
                    .put(update_food_item)
                    .delete(delete_food_item),
            ),
    )
}
