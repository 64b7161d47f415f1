//! Relay client that talks to a remote `POST /api/bot` over HTTP

use super::{RelayClient, RelayFailure};
use crate::conversation::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub struct HttpRelayClient {
    client: Client,
    url: String,
}

/// Borrowing twin of [`crate::relay::CompletionRequest`] so the history is not cloned
#[derive(Serialize)]
struct CompletionRequestRef<'a> {
    input: &'a [Message],
}

impl HttpRelayClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RelayFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayFailure::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, input: &[Message]) -> Result<Message, RelayFailure> {
        let response = self
            .client
            .post(&self.url)
            .json(&CompletionRequestRef { input })
            .send()
            .await
            .map_err(|e| RelayFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayFailure::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RelayFailure::Transport(format!("Failed to read response: {e}")))?;

        serde_json::from_slice::<Message>(&body).map_err(|e| RelayFailure::Malformed(e.to_string()))
    }
}
