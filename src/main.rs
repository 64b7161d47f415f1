//! Travel Concierge - chat front-end for an LLM travel assistant
//!
//! Serves server-rendered conversation pages, relays each conversation's
//! history to the completion API, and guards audio uploads for transcription.

mod api;
mod config;
mod conversation;
mod llm;
mod orchestrator;
mod relay;
mod system_prompt;
mod transcription;

use api::{create_router, AppState};
use config::AppConfig;
use conversation::ConversationRegistry;
use llm::{LlmService, LoggingService, OpenAIService};
use orchestrator::{HttpRelayClient, Orchestrator, RelayClient};
use relay::Relay;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_concierge=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    // Completion API client, built once and shared
    let openai = Arc::new(OpenAIService::new(&config.llm)?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(openai.clone()));
    tracing::info!(model = %llm.model_id(), base_url = %config.llm.base_url, "Completion client initialized");

    let relay = Arc::new(Relay::new(llm));

    // The orchestrator talks to a remote relay when one is configured
    let relay_client: Arc<dyn RelayClient> = match &config.relay_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote relay");
            Arc::new(HttpRelayClient::new(url.clone(), config.request_timeout)?)
        }
        None => relay.clone(),
    };
    let orchestrator = Orchestrator::new(relay_client, config.request_timeout);

    // Conversations are dropped once idle past the TTL
    let conversations = Arc::new(ConversationRegistry::new(config.idle_ttl));
    conversations.spawn_sweeper();

    // Create application state
    let state = AppState::new(conversations, relay, orchestrator, openai);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Travel concierge listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
