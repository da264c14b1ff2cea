//! NutriBot: free-text nutrition questions proxied to a language model.

mod client;

pub use client::{ChatClient, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = "You are NutriBot, a friendly and precise nutrition assistant. \
Help the user reach their calorie goals, suggest meals and answer nutrition questions clearly.";
pub const GREETING: &str = "Hi! I'm NutriBot, how can I help you today?";
/// Shown in place of a reply when the request fails.
pub const FALLBACK_REPLY: &str = "Sorry, the reply could not be delivered.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No chat API key configured")]
    MissingApiKey,
    #[error("Chat request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Chat service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Chat service returned no reply")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation as the user sees it: greeting, questions and replies.
///
/// The system prompt is sent with every request but never shown.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn request_for(&self, text: &str) -> Vec<ChatMessage> {
        let mut request = Vec::with_capacity(self.messages.len() + 2);
        request.push(ChatMessage::system(self.system_prompt.clone()));
        request.extend(self.messages.iter().cloned());
        request.push(ChatMessage::user(text));
        request
    }

    /// Records `text` as a user message and asks `client` for a reply.
    ///
    /// Any failure is logged and answered with [`FALLBACK_REPLY`]. Blank
    /// input is ignored and returns `None`.
    pub async fn send(&mut self, client: &ChatClient, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let request = self.request_for(text);
        self.messages.push(ChatMessage::user(text));

        let reply = match client.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                FALLBACK_REPLY.to_string()
            }
        };

        self.messages.push(ChatMessage::assistant(reply));
        self.messages.last()
    }
}
