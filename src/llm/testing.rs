//! Mock completion provider for tests

use super::{LlmError, LlmRequest, LlmResponse, LlmService, TranscriptionService, Usage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock provider that returns queued responses and records requests
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    transcripts: Mutex<VecDeque<Result<String, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
    /// Record of uploaded audio as (file name, byte length)
    pub uploads: Mutex<Vec<(String, usize)>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            transcripts: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain text reply that finished normally
    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue_response(LlmResponse {
            text: text.into(),
            finish_reason: Some("stop".to_string()),
            usage: Usage::default(),
        });
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_transcript(&self, result: Result<String, LlmError>) {
        self.transcripts.lock().unwrap().push_back(result);
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn recorded_uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl TranscriptionService for MockLlmService {
    async fn transcribe(
        &self,
        file_name: &str,
        _media_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String, LlmError> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), data.len()));
        self.transcripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock transcript queued")))
    }
}
