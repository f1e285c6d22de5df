use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use services::services::chatbot::{ChatContext, ChatMessage, ChatbotError, ChatbotService};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{error::ApiError, extract::CurrentUser, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, TS)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/chat
pub async fn send_message(
    State(_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    axum::Json(payload): axum::Json<ChatRequest>,
) -> Result<ResponseJson<ApiResponse<ChatResponse>>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ChatbotError::EmptyMessage.into());
    }

    let context = ChatContext {
        user_id: user.user_id,
        user_name: user.name.clone(),
        user_role: user.role,
    };
    let reply = ChatbotService::from_env()?
        .generate_response(&context, &payload.history, &payload.message)
        .await?;

    Ok(ResponseJson(ApiResponse::success(ChatResponse { reply })))
}

/// GET /api/chat/suggestions
pub async fn suggestions(
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<&'static str>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(
        ChatbotService::suggested_questions(user.role),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/chat",
        Router::new()
            .route("/", post(send_message))
            .route("/suggestions", get(suggestions)),
    )
}
