//! HTTP request handlers

use super::assets::serve_static;
use super::pages::render_conversation;
use super::types::{
    ChatForm, ChatRequest, ChatResponse, ConversationResponse, ErrorResponse,
    TranscriptionResponse,
};
use super::AppState;
use crate::conversation::{Conversation, Message};
use crate::orchestrator::SubmitError;
use crate::relay::{CompletionRequest, RelayError};
use crate::transcription::{FileSelection, SelectedFile, TranscriptionError, MAX_AUDIO_BYTES};
use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Body cap for uploads. Files between the audio limit and this cap are
/// rejected by the selection guard; anything larger trips the body limit,
/// which [`upload_error`] reports with the same warning.
const MAX_UPLOAD_BODY_BYTES: usize = 4 * MAX_AUDIO_BYTES;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat pages
        .route("/", get(new_conversation_page))
        .route("/c/:id", get(conversation_page))
        .route("/c/:id/chat", post(submit_form))
        // Static assets
        .route("/assets/*path", get(serve_static))
        // JSON conversation API
        .route("/api/conversations", post(create_conversation))
        .route("/api/conversations/:id", get(get_conversation))
        .route("/api/conversations/:id/chat", post(send_chat))
        // Relay to the completion API
        .route("/api/bot", post(relay_completion))
        // Audio transcription
        .route(
            "/api/whisper",
            post(transcribe).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn find_conversation(state: &AppState, id: &str) -> Result<Arc<Conversation>, AppError> {
    state
        .conversations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Conversation not found: {id}")))
}

// ============================================================
// Chat Pages
// ============================================================

async fn new_conversation_page(State(state): State<AppState>) -> Redirect {
    let conversation = state.conversations.create().await;
    Redirect::to(&format!("/c/{}", conversation.id()))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    error: Option<String>,
}

async fn conversation_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let conversation = find_conversation(&state, &id).await?;
    let snapshot = conversation.state.lock().await.snapshot();
    Ok(Html(render_conversation(
        conversation.id(),
        &snapshot,
        query.error.is_some(),
    )))
}

/// Form post: orchestrate, then redirect back to the page (post/redirect/get)
async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ChatForm>,
) -> Result<Redirect, AppError> {
    let conversation = find_conversation(&state, &id).await?;
    let page = format!("/c/{}", conversation.id());

    let target = match state.orchestrator.submit(conversation, &form.text).await {
        Err(SubmitError::Failed) => format!("{page}?error=1"),
        Ok(_) | Err(SubmitError::EmptyInput | SubmitError::Busy) => page,
    };
    Ok(Redirect::to(&target))
}

// ============================================================
// JSON Conversation API
// ============================================================

async fn create_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    let conversation = state.conversations.create().await;
    let snapshot = conversation.state.lock().await.snapshot();
    Json(ConversationResponse {
        id: conversation.id().to_string(),
        conversation: snapshot,
    })
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = find_conversation(&state, &id).await?;
    let snapshot = conversation.state.lock().await.snapshot();
    Ok(Json(ConversationResponse {
        id: conversation.id().to_string(),
        conversation: snapshot,
    }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let conversation = find_conversation(&state, &id).await?;

    let message = state
        .orchestrator
        .submit(conversation, &req.text)
        .await
        .map_err(|e| match e {
            SubmitError::EmptyInput => AppError::BadRequest(e.to_string()),
            SubmitError::Busy => AppError::Conflict(e.to_string()),
            SubmitError::Failed => AppError::BadGateway(e.to_string()),
        })?;

    Ok(Json(ChatResponse { message }))
}

// ============================================================
// Relay
// ============================================================

async fn relay_completion(
    State(state): State<AppState>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<Message>, AppError> {
    // Shape failures get 400 rather than the generic 500 so callers can tell
    // a bad request from an upstream outage
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    match state.relay.complete(req.input).await {
        Ok(message) => Ok(Json(message)),
        Err(RelayError::EmptyInput) => Err(AppError::BadRequest(
            RelayError::EmptyInput.to_string(),
        )),
        Err(e) => {
            tracing::error!(error = %e, "Relay request failed");
            Err(AppError::Internal("Internal server error".to_string()))
        }
    }
}

// ============================================================
// Transcription
// ============================================================

async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let mut selection = FileSelection::new(MAX_AUDIO_BYTES);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(&e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("audio").to_string();
        let media_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| upload_error(&e))?;
        selection.select(SelectedFile::new(name, media_type, data.to_vec()))?;
    }

    let file = selection.take()?;
    let text = state
        .transcriber
        .transcribe(&file.name, file.media_type.as_deref(), file.data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e.message, kind = ?e.kind, "Transcription failed");
            AppError::Internal("Internal server error".to_string())
        })?;

    Ok(Json(TranscriptionResponse { text }))
}

/// A body over the upload cap is an oversized file, not a malformed form
fn upload_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        // Size is only known to exceed the cap
        TranscriptionError::FileTooLarge {
            size: MAX_UPLOAD_BODY_BYTES,
            limit: MAX_AUDIO_BYTES,
        }
        .into()
    } else {
        AppError::BadRequest(e.body_text())
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("travel-concierge ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    BadGateway(String),
    Internal(String),
}

impl From<TranscriptionError> for AppError {
    fn from(e: TranscriptionError) -> Self {
        match e {
            TranscriptionError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            TranscriptionError::NoFile => AppError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
