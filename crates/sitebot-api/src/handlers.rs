//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path parameters and JSON bodies via axum
//! extractors, calls into the chatbot registry and returns JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitebot_core::types::{ChatbotProfile, ConversationTurn, NewChatbot};
use uuid::Uuid;

use crate::error::ApiError;
use crate::registry::Exchange;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Request body for PUT /chatbots/{id}/knowledge-base.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseUpdate {
    pub knowledge_base: String,
}

/// Request body for POST /chatbots/{id}/messages.
#[derive(Debug, Deserialize, Serialize)]
pub struct SendMessageRequest {
    pub text: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub chatbots: usize,
    pub model: String,
    pub credentials_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatbotListResponse {
    pub chatbots: Vec<ChatbotProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedResponse {
    pub chatbot_id: Uuid,
    pub snippet: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid chatbot id '{}'", raw)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        chatbots: state.registry.len(),
        model: state.config.provider.model.clone(),
        credentials_configured: state.config.provider.has_credentials(),
    })
}

/// GET /chatbots - all chatbots, oldest first.
pub async fn list_chatbots(
    State(state): State<AppState>,
) -> Result<Json<ChatbotListResponse>, ApiError> {
    let chatbots = state.registry.list()?;
    Ok(Json(ChatbotListResponse { chatbots }))
}

/// POST /chatbots - create a chatbot.
pub async fn create_chatbot(
    State(state): State<AppState>,
    body: Result<Json<NewChatbot>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatbotProfile>), ApiError> {
    let form = json_body(body)?;
    let profile = state.registry.create(form)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /chatbots/{id} - one chatbot.
pub async fn get_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatbotProfile>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.registry.get(id)?))
}

/// DELETE /chatbots/{id} - remove a chatbot and its conversation.
pub async fn delete_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.registry.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /chatbots/{id}/knowledge-base - replace the knowledge base.
pub async fn replace_knowledge_base(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<KnowledgeBaseUpdate>, JsonRejection>,
) -> Result<Json<ChatbotProfile>, ApiError> {
    let id = parse_id(&id)?;
    let update = json_body(body)?;
    let profile = state
        .registry
        .replace_knowledge_base(id, update.knowledge_base)
        .await?;
    Ok(Json(profile))
}

/// GET /chatbots/{id}/messages - the test conversation.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let id = parse_id(&id)?;
    let transcript = state.registry.transcript(id).await?;
    Ok(Json(TranscriptResponse {
        messages: transcript.turns().to_vec(),
    }))
}

/// POST /chatbots/{id}/messages - send a message and get the reply.
///
/// A provider failure still answers 200 with the fallback reply.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<Exchange>, ApiError> {
    let id = parse_id(&id)?;
    let request = json_body(body)?;
    let exchange = state.registry.send_message(id, request.text).await?;
    Ok(Json(exchange))
}

/// DELETE /chatbots/{id}/messages - clear the conversation.
pub async fn reset_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.registry.reset_transcript(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /chatbots/{id}/embed - website embed snippet.
pub async fn embed_snippet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let snippet = state.registry.embed_snippet(id)?;
    Ok(Json(EmbedResponse {
        chatbot_id: id,
        snippet,
    }))
}
