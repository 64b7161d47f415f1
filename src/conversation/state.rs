//! Conversation state and its three permitted mutations

use super::{Message, Role};
use serde::Serialize;
use thiserror::Error;

/// Assistant greeting every new conversation starts with
pub const GREETING: &str = "私は旅行コンシェルジュです。旅行についての質問にお答えいたします。";

/// Errors returned when a mutation is refused. State is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting for the previous response")]
    AwaitingResponse,
    #[error("No response is outstanding")]
    NotAwaiting,
    #[error("Expected an assistant message, got {0}")]
    UnexpectedRole(Role),
}

/// Ordered message history plus the single-flight flag
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    awaiting_response: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// New conversation seeded with the assistant greeting
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            awaiting_response: false,
        }
    }

    /// Append a user message and mark the conversation as awaiting a reply.
    ///
    /// Blank text and submissions while a reply is outstanding are refused.
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<(), ConversationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConversationError::EmptyMessage);
        }
        if self.awaiting_response {
            return Err(ConversationError::AwaitingResponse);
        }
        self.messages.push(Message::user(text));
        self.awaiting_response = true;
        Ok(())
    }

    /// Append the reply to the outstanding request and clear the flag
    pub fn append_assistant(&mut self, message: Message) -> Result<(), ConversationError> {
        if message.role() != Role::Assistant {
            return Err(ConversationError::UnexpectedRole(message.role()));
        }
        if !self.awaiting_response {
            return Err(ConversationError::NotAwaiting);
        }
        self.messages.push(message);
        self.awaiting_response = false;
        Ok(())
    }

    /// Clear the flag without appending; the failed user message stays so
    /// the user can resubmit.
    pub fn on_failure(&mut self) {
        self.awaiting_response = false;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            awaiting_response: self.awaiting_response,
        }
    }
}

/// Read-only copy of a conversation for rendering and the JSON API
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub awaiting_response: bool,
}
