//! API request and response types

use crate::conversation::{ConversationSnapshot, Message};
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// HTML form submission from the chat page
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub text: String,
}

/// Response for a successful chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: Message,
}

/// Conversation with its messages
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    #[serde(flatten)]
    pub conversation: ConversationSnapshot,
}

/// Response for transcription
#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
