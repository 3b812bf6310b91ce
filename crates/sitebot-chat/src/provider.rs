//! Generation provider capability.
//!
//! The orchestrator only knows this trait. Real clients (see `gemini`) and
//! the deterministic `ScriptedProvider` used in tests both implement it.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ChatError;

// =============================================================================
// Request / response
// =============================================================================

/// Role tag understood by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One role-tagged turn sent to the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationTurn {
    pub role: Role,
    pub text: String,
}

impl GenerationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Everything the provider receives for one reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub turns: Vec<GenerationTurn>,
    pub system_instruction: String,
}

/// The provider's textual result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: String,
}

// =============================================================================
// GenerationProvider trait
// =============================================================================

/// Opaque "generate text from role-tagged turns and a system instruction" capability.
///
/// Implementations may be slow or fail; callers must not assume otherwise.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Produce one textual result for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ChatError>;
}

// =============================================================================
// ScriptedProvider
// =============================================================================

/// One scripted provider outcome.
#[derive(Debug)]
pub enum ScriptedOutcome {
    Reply(String),
    DelayedReply(Duration, String),
    Fail(ChatError),
}

/// Deterministic in-process provider.
///
/// Replays queued outcomes in order and records every request it receives.
/// Once the queue is drained it answers with the fallback reply, if one was
/// set, and fails otherwise.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    fallback: Option<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers every request with the same text.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::default()
        }
    }

    /// A provider that fails every request with a transport error.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Queue another outcome.
    pub fn push(&self, outcome: ScriptedOutcome) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ChatError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let outcome = {
            let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
            script.pop_front()
        };

        match outcome {
            Some(ScriptedOutcome::Reply(text)) => Ok(GenerationResponse { text }),
            Some(ScriptedOutcome::DelayedReply(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(GenerationResponse { text })
            }
            Some(ScriptedOutcome::Fail(err)) => Err(err),
            None => match &self.fallback {
                Some(text) => Ok(GenerationResponse { text: text.clone() }),
                None => Err(ChatError::Transport("scripted provider has no reply".to_string())),
            },
        }
    }
}
