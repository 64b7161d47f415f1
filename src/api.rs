//! HTTP API and chat pages

mod assets;
mod handlers;
mod pages;
mod types;

pub use handlers::create_router;

use crate::conversation::ConversationRegistry;
use crate::llm::TranscriptionService;
use crate::orchestrator::Orchestrator;
use crate::relay::Relay;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationRegistry>,
    pub orchestrator: Orchestrator,
    pub relay: Arc<Relay>,
    pub transcriber: Arc<dyn TranscriptionService>,
}

impl AppState {
    pub fn new(
        conversations: Arc<ConversationRegistry>,
        relay: Arc<Relay>,
        orchestrator: Orchestrator,
        transcriber: Arc<dyn TranscriptionService>,
    ) -> Self {
        Self {
            conversations,
            orchestrator,
            relay,
            transcriber,
        }
    }
}
