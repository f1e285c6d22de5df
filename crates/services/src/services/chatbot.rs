//! Chat assistant for the platform, backed by the Claude API.
//!
//! The assistant answers questions about donating food, requesting food,
//! pickup logistics, and food-safety basics. Conversation history is kept
//! by the caller and passed through on every turn, so the service itself
//! is stateless.

use chrono::{DateTime, Utc};
use db::models::user::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::services::claude_api::{ClaudeApiClient, ClaudeApiError, Message};

const MAX_RESPONSE_TOKENS: u32 = 1024;
const MAX_HISTORY_TURNS: usize = 20;

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error(transparent)]
    Api(#[from] ClaudeApiError),
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Who is talking to the assistant. Shapes the system prompt.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a conversation, as stored by the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

pub struct ChatbotService {
    client: ClaudeApiClient,
}

impl ChatbotService {
    pub fn from_env() -> Result<Self, ChatbotError> {
        Ok(Self {
            client: ClaudeApiClient::from_env()?,
        })
    }

    pub fn with_client(client: ClaudeApiClient) -> Self {
        Self { client }
    }

    /// Generate a reply to `message` given the prior `history`.
    pub async fn generate_response(
        &self,
        context: &ChatContext,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatbotError> {
        if message.trim().is_empty() {
            return Err(ChatbotError::EmptyMessage);
        }

        let system = Self::system_prompt(context);
        let messages = Self::build_messages(history, message);

        let reply = self
            .client
            .complete(messages, Some(system), MAX_RESPONSE_TOKENS)
            .await?;
        Ok(reply)
    }

    /// Starter questions shown in the chat widget, tailored to the role.
    pub fn suggested_questions(role: Role) -> Vec<&'static str> {
        match role {
            Role::Donor => vec![
                "How do I list surplus food for donation?",
                "What food safety rules apply to cooked food?",
                "How does pickup scheduling work?",
            ],
            Role::Receiver | Role::Ngo => vec![
                "How do I request food for my organization?",
                "How are donations matched to my requests?",
                "Can I see donors near my location?",
            ],
            Role::Admin => vec![
                "How do I verify an NGO account?",
                "Where can I see platform-wide statistics?",
            ],
            Role::Unknown => vec![
                "What is FoodBridge and how does it work?",
                "How do I sign up as a donor or receiver?",
            ],
        }
    }

    fn system_prompt(context: &ChatContext) -> String {
        let role_line = match context.user_role {
            Role::Donor => "The user is a food donor who lists surplus food for pickup.",
            Role::Receiver => "The user is a receiver who requests food on behalf of people in need.",
            Role::Ngo => "The user represents an NGO that collects and distributes donations.",
            Role::Admin => "The user is a platform administrator.",
            Role::Unknown => "The user is browsing without a recognised role.",
        };

        format!(
            "You are the FoodBridge assistant. FoodBridge connects food donors \
             (restaurants, events, households) with NGOs and receivers so surplus \
             food reaches people in need instead of going to waste.\n\
             {role_line}\n\
             The user's name is {name}.\n\
             Answer questions about donating food, requesting food, pickup \
             logistics, and basic food safety. Keep answers short and practical. \
             If a question is outside the platform's scope, say so politely.",
            name = context.user_name,
        )
    }

    fn build_messages(history: &[ChatMessage], message: &str) -> Vec<Message> {
        let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
        let mut messages: Vec<Message> = history[start..]
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Message::user(m.content.clone()),
                ChatRole::Assistant => Message::assistant(m.content.clone()),
            })
            .collect();
        messages.push(Message::user(message.to_string()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_truncated_to_recent_turns() {
        let history: Vec<ChatMessage> = (0..30)
            .map(|i| ChatMessage::user(format!("turn {i}")))
            .collect();
        let messages = ChatbotService::build_messages(&history, "latest");
        assert_eq!(messages.len(), MAX_HISTORY_TURNS + 1);
        assert_eq!(messages[0].content, "turn 10");
        assert_eq!(messages.last().map(|m| m.content.as_str()), Some("latest"));
    }

    #[test]
    fn system_prompt_mentions_user() {
        let context = ChatContext {
            user_id: Uuid::new_v4(),
            user_name: "Priya".to_string(),
            user_role: Role::Donor,
        };
        let prompt = ChatbotService::system_prompt(&context);
        assert!(prompt.contains("Priya"));
        assert!(prompt.contains("donor"));
    }

    #[test]
    fn suggested_questions_cover_every_role() {
        for role in [
            Role::Donor,
            Role::Receiver,
            Role::Ngo,
            Role::Admin,
            Role::Unknown,
        ] {
            assert!(!ChatbotService::suggested_questions(role).is_empty());
        }
    }
}
