//! Gemini client tests against a local fake `generateContent` endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use sitebot_chat::{
    ChatError, GeminiProvider, GenerationProvider, GenerationRequest, GenerationTurn,
    ResponseOrchestrator, TRANSPORT_FALLBACK_REPLY,
};
use sitebot_core::types::{ChatbotProfile, ConversationTurn, NewChatbot};

// =============================================================================
// Fake server
// =============================================================================

#[derive(Clone, Debug)]
struct Captured {
    path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: Value,
    delay: Duration,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn generate_content(
    State(state): State<FakeState>,
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.captured.lock().unwrap().push(Captured {
        path: model_action,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.reply.clone())).into_response()
}

async fn spawn_fake(
    status: StatusCode,
    reply: Value,
    delay: Duration,
) -> (SocketAddr, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        status,
        reply,
        delay,
        captured: captured.clone(),
    };
    let app = Router::new()
        .route("/models/{model_action}", post(generate_content))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, captured)
}

fn provider_for(addr: SocketAddr, timeout: Duration) -> GeminiProvider {
    GeminiProvider::new(
        Some("test-key".to_string()),
        "gemini-test",
        format!("http://{}/models", addr),
        timeout,
    )
    .unwrap()
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn request() -> GenerationRequest {
    GenerationRequest {
        turns: vec![
            GenerationTurn::user("Hi"),
            GenerationTurn::model("Hello! How can I help?"),
            GenerationTurn::user("When do you ship?"),
        ],
        system_instruction: "KNOWLEDGE BASE:\n---\nAcme ships in 3 days.\n---\n".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_successful_generation() {
    let (addr, captured) = spawn_fake(
        StatusCode::OK,
        text_reply("We ship within 3 days."),
        Duration::ZERO,
    )
    .await;
    let provider = provider_for(addr, Duration::from_secs(5));

    let response = provider.generate(&request()).await.unwrap();
    assert_eq!(response.text, "We ship within 3 days.");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].path, "gemini-test:generateContent");
    assert_eq!(captured[0].api_key.as_deref(), Some("test-key"));
}

#[tokio::test]
async fn test_request_carries_turns_and_instruction() {
    let (addr, captured) = spawn_fake(StatusCode::OK, text_reply("ok"), Duration::ZERO).await;
    let provider = provider_for(addr, Duration::from_secs(5));

    provider.generate(&request()).await.unwrap();

    let body = captured.lock().unwrap()[0].body.clone();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "When do you ship?");
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "KNOWLEDGE BASE:\n---\nAcme ships in 3 days.\n---\n"
    );
}

#[tokio::test]
async fn test_error_status_mapped() {
    let (addr, _) = spawn_fake(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        Duration::ZERO,
    )
    .await;
    let provider = provider_for(addr, Duration::from_secs(5));

    match provider.generate(&request()).await {
        Err(ChatError::Provider { status, message }) => {
            assert_eq!(status, 429);
            assert!(message.contains("RESOURCE_EXHAUSTED"));
            assert!(message.contains("Quota exceeded"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blocked_prompt_is_empty_response() {
    let (addr, _) = spawn_fake(
        StatusCode::OK,
        json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        Duration::ZERO,
    )
    .await;
    let provider = provider_for(addr, Duration::from_secs(5));

    assert!(matches!(
        provider.generate(&request()).await,
        Err(ChatError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_malformed_body() {
    let (addr, _) = spawn_fake(
        StatusCode::OK,
        json!({"candidates": "not-a-list"}),
        Duration::ZERO,
    )
    .await;
    let provider = provider_for(addr, Duration::from_secs(5));

    assert!(matches!(
        provider.generate(&request()).await,
        Err(ChatError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let (addr, _) = spawn_fake(
        StatusCode::OK,
        text_reply("too late"),
        Duration::from_secs(2),
    )
    .await;
    let provider = provider_for(addr, Duration::from_millis(200));

    assert!(matches!(
        provider.generate(&request()).await,
        Err(ChatError::Transport(_))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider_for(addr, Duration::from_secs(2));
    assert!(matches!(
        provider.generate(&request()).await,
        Err(ChatError::Transport(_))
    ));
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let (addr, captured) = spawn_fake(StatusCode::OK, text_reply("ok"), Duration::ZERO).await;
    let provider = GeminiProvider::new(
        None,
        "gemini-test",
        format!("http://{}/models", addr),
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(matches!(
        provider.generate(&request()).await,
        Err(ChatError::MissingCredentials)
    ));
    assert!(captured.lock().unwrap().is_empty());
}

// ---- Through the orchestrator ----

fn acme() -> ChatbotProfile {
    ChatbotProfile::create(NewChatbot {
        name: "Acme".to_string(),
        website: None,
        knowledge_base: "Acme ships in 3 days.".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_orchestrator_relays_gemini_reply() {
    let (addr, captured) = spawn_fake(
        StatusCode::OK,
        text_reply("Acme ships in 3 days."),
        Duration::ZERO,
    )
    .await;
    let orchestrator = ResponseOrchestrator::new(Arc::new(provider_for(addr, Duration::from_secs(5))));

    let prior = vec![
        ConversationTurn::user("Hi"),
        ConversationTurn::assistant("Hello!"),
    ];
    let reply = orchestrator
        .respond(&acme(), &prior, "When do you ship?")
        .await;
    assert_eq!(reply, "Acme ships in 3 days.");

    let body = captured.lock().unwrap()[0].body.clone();
    let instruction = body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(instruction.contains("Acme ships in 3 days."));
    assert_eq!(body["contents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_orchestrator_falls_back_on_server_error() {
    let (addr, _) = spawn_fake(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}),
        Duration::ZERO,
    )
    .await;
    let orchestrator = ResponseOrchestrator::new(Arc::new(provider_for(addr, Duration::from_secs(5))));

    let reply = orchestrator.respond(&acme(), &[], "When do you ship?").await;
    assert_eq!(reply, TRANSPORT_FALLBACK_REPLY);
}
