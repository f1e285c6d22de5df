pub mod access_guard;
pub mod analytics;
pub mod auth;
pub mod chatbot;
pub mod claude_api;
pub mod expiry;
pub mod matching;
