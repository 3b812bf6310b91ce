//! Response orchestrator: turns a profile, a transcript and a new message into one reply.
//!
//! Every call builds the grounding instruction and the provider turns from
//! scratch, makes exactly one provider request and never fails towards the
//! caller: provider errors become `TRANSPORT_FALLBACK_REPLY`.

use std::sync::Arc;
use std::time::Duration;

use sitebot_core::types::{ChatbotProfile, ConversationTurn};

use crate::error::ChatError;
use crate::history::{map_turns, HistoryWindow};
use crate::prompt::build_system_instruction;
use crate::provider::{GenerationProvider, GenerationRequest};

/// Reply used whenever the provider cannot produce one.
pub const TRANSPORT_FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my brain right now. Please try again in a moment.";

/// Reject empty or over-long user messages.
///
/// Length is counted in characters. Hosts call this before `respond`.
pub fn validate_message(text: &str, max_length: usize) -> Result<(), ChatError> {
    if text.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    if text.chars().count() > max_length {
        return Err(ChatError::MessageTooLong(max_length));
    }
    Ok(())
}

/// Stateless coordinator between the host and the generation provider.
///
/// Holds only the injected provider and the history policy, so one instance
/// can be shared across tasks and chatbots.
pub struct ResponseOrchestrator {
    provider: Arc<dyn GenerationProvider>,
    history_window: HistoryWindow,
}

impl ResponseOrchestrator {
    /// Create an orchestrator around the given provider, resending full history.
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            history_window: HistoryWindow::Unbounded,
        }
    }

    /// Limit how much prior history is sent per call.
    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.history_window = window;
        self
    }

    pub fn history_window(&self) -> HistoryWindow {
        self.history_window
    }

    /// Build the provider request for one call.
    pub fn build_request(
        &self,
        profile: &ChatbotProfile,
        prior: &[ConversationTurn],
        new_user_text: &str,
    ) -> GenerationRequest {
        GenerationRequest {
            turns: map_turns(prior, new_user_text, self.history_window),
            system_instruction: build_system_instruction(profile),
        }
    }

    /// Produce the assistant reply for `new_user_text`.
    ///
    /// `prior` is the transcript before the new message. Never fails: any
    /// provider error is logged and answered with `TRANSPORT_FALLBACK_REPLY`.
    pub async fn respond(
        &self,
        profile: &ChatbotProfile,
        prior: &[ConversationTurn],
        new_user_text: &str,
    ) -> String {
        match self.try_respond(profile, prior, new_user_text).await {
            Ok(reply) => reply,
            Err(err) => self.fallback(profile, new_user_text, &err),
        }
    }

    /// Like `respond`, but gives up after `deadline`.
    ///
    /// Expiry is handled exactly like a provider failure; the in-flight
    /// request is dropped and its result discarded.
    pub async fn respond_within(
        &self,
        profile: &ChatbotProfile,
        prior: &[ConversationTurn],
        new_user_text: &str,
        deadline: Duration,
    ) -> String {
        let result =
            tokio::time::timeout(deadline, self.try_respond(profile, prior, new_user_text)).await;
        match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => self.fallback(profile, new_user_text, &err),
            Err(_) => self.fallback(profile, new_user_text, &ChatError::Timeout(deadline)),
        }
    }

    /// One provider round trip, with errors exposed.
    ///
    /// A blank provider result counts as `ChatError::EmptyResponse`; any other
    /// text is returned unchanged.
    pub async fn try_respond(
        &self,
        profile: &ChatbotProfile,
        prior: &[ConversationTurn],
        new_user_text: &str,
    ) -> Result<String, ChatError> {
        let request = self.build_request(profile, prior, new_user_text);
        let turn_count = request.turns.len();

        let response = self.provider.generate(&request).await?;
        if response.text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        tracing::debug!(
            chatbot_id = %profile.id,
            provider = self.provider.name(),
            turns = turn_count,
            reply_len = response.text.len(),
            "Reply generated"
        );
        Ok(response.text)
    }

    fn fallback(&self, profile: &ChatbotProfile, new_user_text: &str, err: &ChatError) -> String {
        tracing::warn!(
            chatbot_id = %profile.id,
            provider = self.provider.name(),
            message_len = new_user_text.chars().count(),
            error = %err,
            "Generation failed, answering with fallback reply"
        );
        TRANSPORT_FALLBACK_REPLY.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
