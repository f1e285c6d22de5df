use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::{
    analytics::AnalyticsError, auth::AuthError, chatbot::ChatbotError, matching::MatchingError,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Chatbot(#[from] ChatbotError),
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Unauthorized) | Self::Auth(AuthError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::EmailTaken)
            | Self::Auth(AuthError::InvalidRole)
            | Self::Chatbot(ChatbotError::EmptyMessage)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound
            | Self::Database(sqlx::Error::RowNotFound)
            | Self::Matching(MatchingError::RequestNotFound)
            | Self::Analytics(AnalyticsError::ProfileNotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("request failed: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
