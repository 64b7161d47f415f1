//! Relay between the chat front-end and the completion API
//!
//! Stateless: each call takes the full history, prepends the concierge
//! prompt, makes exactly one completion request, and returns one assistant
//! message.

use crate::conversation::Message;
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::orchestrator::{RelayClient, RelayFailure};
use crate::system_prompt::with_system_prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Low randomness keeps answers factual
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Body accepted by `POST /api/bot`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub input: Vec<Message>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Request contained no messages")]
    EmptyInput,
    #[error("Completion failed: {0}")]
    Upstream(#[from] LlmError),
    #[error("Completion returned no text")]
    EmptyCompletion,
}

pub struct Relay {
    llm: Arc<dyn LlmService>,
}

impl Relay {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Shape check plus prompt assembly. Pure, no I/O.
    pub fn build_request(input: Vec<Message>) -> Result<LlmRequest, RelayError> {
        if input.is_empty() {
            return Err(RelayError::EmptyInput);
        }
        Ok(LlmRequest {
            messages: with_system_prompt(input),
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_OUTPUT_TOKENS),
        })
    }

    pub async fn complete(&self, input: Vec<Message>) -> Result<Message, RelayError> {
        let request = Self::build_request(input)?;
        let response = self.llm.complete(&request).await?;

        if response.truncated() {
            tracing::warn!(model = %self.llm.model_id(), "Completion hit the output token limit");
        }
        if response.text.trim().is_empty() {
            return Err(RelayError::EmptyCompletion);
        }
        Ok(Message::assistant(response.text))
    }
}

#[async_trait]
impl RelayClient for Relay {
    async fn send(&self, input: &[Message]) -> Result<Message, RelayFailure> {
        self.complete(input.to_vec()).await.map_err(|e| match e {
            RelayError::EmptyInput => RelayFailure::Rejected(e.to_string()),
            RelayError::Upstream(_) | RelayError::EmptyCompletion => {
                RelayFailure::Upstream(e.to_string())
            }
        })
    }
}
