//! Completion request orchestration
//!
//! One user submission produces at most one relay call:
//! validate, append the user message, send the full history, then either
//! append the assistant reply or reset the awaiting flag.

mod http;

#[cfg(test)]
pub mod testing;

pub use http::HttpRelayClient;

use crate::conversation::{Conversation, ConversationError, Message, Role};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Anything that can turn a history into one assistant reply
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, input: &[Message]) -> Result<Message, RelayFailure>;
}

/// Why a relay call produced no usable reply. Logged, never shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayFailure {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Relay returned HTTP {0}")]
    Status(u16),
    #[error("Malformed relay response: {0}")]
    Malformed(String),
    #[error("Relay rejected the request: {0}")]
    Rejected(String),
    #[error("Completion failed: {0}")]
    Upstream(String),
    #[error("Reply had role {0}, expected assistant")]
    UnexpectedRole(Role),
    #[error("No reply within {0:?}")]
    Timeout(Duration),
}

/// Outcome of a submission that did not yield a reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("Still waiting for the previous response")]
    Busy,
    #[error("Something went wrong. Please try again.")]
    Failed,
}

#[derive(Clone)]
pub struct Orchestrator {
    relay: Arc<dyn RelayClient>,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(relay: Arc<dyn RelayClient>, timeout: Duration) -> Self {
        Self { relay, timeout }
    }

    /// Submit user text to a conversation and wait for the outcome.
    ///
    /// The relay call and reconciliation run on a spawned task so that a
    /// dropped caller (e.g. a disconnected browser) cannot leave the
    /// conversation stuck in the awaiting state.
    pub async fn submit(
        &self,
        conversation: Arc<Conversation>,
        text: &str,
    ) -> Result<Message, SubmitError> {
        if text.trim().is_empty() {
            tracing::debug!(conv_id = %conversation.id(), "Ignoring empty message");
            return Err(SubmitError::EmptyInput);
        }

        let history = {
            let mut state = conversation.state.lock().await;
            state.append_user(text).map_err(|e| match e {
                ConversationError::AwaitingResponse => {
                    tracing::debug!(conv_id = %conversation.id(), "Rejected submit while awaiting response");
                    SubmitError::Busy
                }
                _ => SubmitError::EmptyInput,
            })?;
            state.messages().to_vec()
        };

        let relay = self.relay.clone();
        let timeout = self.timeout;
        let conv = conversation.clone();
        let task = tokio::spawn(async move {
            let result = Self::call_relay(relay.as_ref(), &history, timeout).await;
            Self::reconcile(&conv, result).await
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(conv_id = %conversation.id(), error = %e, "Request task failed");
                conversation.state.lock().await.on_failure();
                Err(SubmitError::Failed)
            }
        }
    }

    async fn call_relay(
        relay: &dyn RelayClient,
        history: &[Message],
        timeout: Duration,
    ) -> Result<Message, RelayFailure> {
        let reply = tokio::time::timeout(timeout, relay.send(history))
            .await
            .map_err(|_| RelayFailure::Timeout(timeout))??;

        if reply.role() != Role::Assistant {
            return Err(RelayFailure::UnexpectedRole(reply.role()));
        }
        Ok(reply)
    }

    async fn reconcile(
        conversation: &Conversation,
        result: Result<Message, RelayFailure>,
    ) -> Result<Message, SubmitError> {
        let mut state = conversation.state.lock().await;
        match result {
            Ok(reply) => match state.append_assistant(reply.clone()) {
                Ok(()) => Ok(reply),
                Err(e) => {
                    tracing::warn!(conv_id = %conversation.id(), error = %e, "Could not append reply");
                    state.on_failure();
                    Err(SubmitError::Failed)
                }
            },
            Err(failure) => {
                tracing::warn!(conv_id = %conversation.id(), error = %failure, "Completion request failed");
                state.on_failure();
                Err(SubmitError::Failed)
            }
        }
    }
}
