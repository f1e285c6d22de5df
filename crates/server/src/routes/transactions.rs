use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    feedback::Feedback,
    food_item::{FoodItem, FoodStatus},
    transaction::{CreateTransaction, Transaction, TransactionFilter, TransactionStatus},
};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

/// GET /api/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Transaction>>>, ApiError> {
    let transactions = Transaction::find_all(&state.db().pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(transactions)))
}

/// GET /api/transactions/{transaction_id}
pub async fn get_transaction(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Transaction>>, ApiError> {
    let transaction = Transaction::find_by_id(&state.db().pool, transaction_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(transaction)))
}

/// POST /api/transactions
///
/// Reserves the food item for the requesting NGO. Only available items can
/// be reserved.
pub async fn create_transaction(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    axum::Json(payload): axum::Json<CreateTransaction>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Transaction>>), ApiError> {
    if payload.quantity <= 0.0 {
        return Err(ApiError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }

    let item = FoodItem::find_by_id(&state.db().pool, payload.food_item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if item.status != FoodStatus::Available {
        return Err(ApiError::BadRequest(format!(
            "food item is not available (status: {})",
            item.status
        )));
    }
    if payload.quantity > item.quantity {
        return Err(ApiError::BadRequest(
            "requested quantity exceeds the listed quantity".to_string(),
        ));
    }

    let transaction = Transaction::create(&state.db().pool, item.donor_id, &payload).await?;
    FoodItem::update_status(&state.db().pool, item.id, FoodStatus::Reserved).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(transaction)),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionStatus {
    pub status: TransactionStatus,
}

/// PUT /api/transactions/{transaction_id}/status
///
/// Completing a transaction marks the item collected; cancelling puts it
/// back on the market. Completed and cancelled are terminal: once there, a
/// transaction cannot move again (otherwise cancelling a completed handoff
/// would resurrect an already collected item).
pub async fn update_transaction_status(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(transaction_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTransactionStatus>,
) -> Result<ResponseJson<ApiResponse<Transaction>>, ApiError> {
    let existing = Transaction::find_by_id(&state.db().pool, transaction_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if matches!(
        existing.status,
        TransactionStatus::Completed | TransactionStatus::Cancelled
    ) {
        return Err(ApiError::BadRequest(format!(
            "transaction is already {}",
            existing.status
        )));
    }

    let transaction =
        Transaction::update_status(&state.db().pool, transaction_id, payload.status)
            .await?
            .ok_or(ApiError::NotFound)?;

    match payload.status {
        TransactionStatus::Completed => {
            FoodItem::update_status(
                &state.db().pool,
                transaction.food_item_id,
                FoodStatus::Collected,
            )
            .await?;
        }
        TransactionStatus::Cancelled => {
            FoodItem::update_status(
                &state.db().pool,
                transaction.food_item_id,
                FoodStatus::Available,
            )
            .await?;
        }
        _ => {}
    }

    Ok(ResponseJson(ApiResponse::success(transaction)))
}

/// GET /api/transactions/{transaction_id}/feedback
pub async fn list_transaction_feedback(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Feedback>>>, ApiError> {
    Transaction::find_by_id(&state.db().pool, transaction_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let feedback = Feedback::find_by_transaction_id(&state.db().pool, transaction_id).await?;
    Ok(ResponseJson(ApiResponse::success(feedback)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/transactions",
        Router::new()
            .route("/", get(list_transactions).post(create_transaction))
            .route("/{transaction_id}", get(get_transaction))
            .route(
                "/{transaction_id}/status",
                axum::routing::put(update_transaction_status),
            )
            .route("/{transaction_id}/feedback", get(list_transaction_feedback)),
    )
}
