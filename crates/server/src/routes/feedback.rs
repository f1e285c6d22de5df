use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    feedback::{CreateFeedback, Feedback},
    transaction::Transaction,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

/// GET /api/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Feedback>>>, ApiError> {
    let feedback = Feedback::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(feedback)))
}

/// GET /api/feedback/{feedback_id}
pub async fn get_feedback(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(feedback_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Feedback>>, ApiError> {
    let feedback = Feedback::find_by_id(&state.db().pool, feedback_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(feedback)))
}

/// POST /api/feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(payload): axum::Json<CreateFeedback>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Feedback>>), ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Transaction::find_by_id(&state.db().pool, payload.transaction_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let feedback = Feedback::create(&state.db().pool, user.user_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(feedback)),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/feedback",
        Router::new()
            .route("/", get(list_feedback).post(create_feedback))
            .route("/{feedback_id}", get(get_feedback)),
    )
}
