//! In-memory chatbot registry.
//!
//! Each chatbot owns its profile and one test conversation. The transcript
//! sits behind an async mutex that is held across the provider call, so
//! messages to the same chatbot are answered strictly one after another
//! while different chatbots proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sitebot_chat::{validate_message, ResponseOrchestrator};
use sitebot_core::config::ChatConfig;
use sitebot_core::types::{ChatbotProfile, ConversationTurn, NewChatbot, Transcript};
use uuid::Uuid;

use crate::error::ApiError;

/// The two turns produced by one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub user_message: ConversationTurn,
    pub reply: ConversationTurn,
}

struct ChatbotEntry {
    profile: RwLock<ChatbotProfile>,
    transcript: tokio::sync::Mutex<Transcript>,
}

impl ChatbotEntry {
    fn new(profile: ChatbotProfile) -> Self {
        Self {
            profile: RwLock::new(profile),
            transcript: tokio::sync::Mutex::new(Transcript::new()),
        }
    }

    fn profile(&self) -> Result<ChatbotProfile, ApiError> {
        self.profile
            .read()
            .map(|p| p.clone())
            .map_err(|e| ApiError::Internal(format!("Profile lock poisoned: {}", e)))
    }
}

/// Registry of chatbots and their conversations.
pub struct ChatbotRegistry {
    entries: RwLock<HashMap<Uuid, Arc<ChatbotEntry>>>,
    orchestrator: Arc<ResponseOrchestrator>,
    chat: ChatConfig,
}

impl ChatbotRegistry {
    pub fn new(orchestrator: Arc<ResponseOrchestrator>, chat: ChatConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            orchestrator,
            chat,
        }
    }

    fn entry(&self, id: Uuid) -> Result<Arc<ChatbotEntry>, ApiError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ApiError::Internal(format!("Registry lock poisoned: {}", e)))?;
        entries
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Chatbot {} not found", id)))
    }

    /// Number of registered chatbots.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate the form and register a new chatbot with an empty conversation.
    pub fn create(&self, form: NewChatbot) -> Result<ChatbotProfile, ApiError> {
        let profile = ChatbotProfile::create(form)?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| ApiError::Internal(format!("Registry lock poisoned: {}", e)))?;
        entries.insert(profile.id, Arc::new(ChatbotEntry::new(profile.clone())));

        tracing::info!(
            chatbot_id = %profile.id,
            name = %profile.name,
            knowledge_base_len = profile.knowledge_base.len(),
            "Chatbot created"
        );
        Ok(profile)
    }

    /// All chatbots, oldest first.
    pub fn list(&self) -> Result<Vec<ChatbotProfile>, ApiError> {
        let entries: Vec<Arc<ChatbotEntry>> = self
            .entries
            .read()
            .map_err(|e| ApiError::Internal(format!("Registry lock poisoned: {}", e)))?
            .values()
            .cloned()
            .collect();

        let mut profiles = entries
            .iter()
            .map(|entry| entry.profile())
            .collect::<Result<Vec<_>, _>>()?;
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(profiles)
    }

    pub fn get(&self, id: Uuid) -> Result<ChatbotProfile, ApiError> {
        self.entry(id)?.profile()
    }

    /// Remove a chatbot and its conversation.
    pub fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let removed = self
            .entries
            .write()
            .map_err(|e| ApiError::Internal(format!("Registry lock poisoned: {}", e)))?
            .remove(&id);

        match removed {
            Some(_) => {
                tracing::info!(chatbot_id = %id, "Chatbot deleted");
                Ok(())
            }
            None => Err(ApiError::NotFound(format!("Chatbot {} not found", id))),
        }
    }

    /// Replace the knowledge base and start a fresh conversation.
    ///
    /// Waits for an in-flight message to this chatbot to finish first.
    pub async fn replace_knowledge_base(
        &self,
        id: Uuid,
        knowledge_base: String,
    ) -> Result<ChatbotProfile, ApiError> {
        let entry = self.entry(id)?;
        let mut transcript = entry.transcript.lock().await;

        let updated = {
            let mut profile = entry
                .profile
                .write()
                .map_err(|e| ApiError::Internal(format!("Profile lock poisoned: {}", e)))?;
            profile.replace_knowledge_base(knowledge_base)?;
            profile.clone()
        };
        *transcript = Transcript::new();

        tracing::info!(
            chatbot_id = %id,
            knowledge_base_len = updated.knowledge_base.len(),
            "Knowledge base replaced, conversation reset"
        );
        Ok(updated)
    }

    /// Validate and send one message, returning the user turn and the reply.
    ///
    /// The provider sees the transcript as it was before this message. A
    /// provider failure or timeout still yields a reply (the fallback text).
    /// Both turns are appended together once the reply exists, so a caller
    /// that drops this future leaves the transcript untouched.
    pub async fn send_message(&self, id: Uuid, text: String) -> Result<Exchange, ApiError> {
        validate_message(&text, self.chat.max_message_length)?;

        let entry = self.entry(id)?;
        let mut transcript = entry.transcript.lock().await;
        let profile = entry.profile()?;

        let user_message = ConversationTurn::user(text);
        let reply_text = self
            .orchestrator
            .respond_within(
                &profile,
                transcript.turns(),
                &user_message.text,
                Duration::from_secs(self.chat.reply_timeout_secs),
            )
            .await;

        let reply = ConversationTurn::assistant(reply_text);
        transcript.push(user_message.clone());
        transcript.push(reply.clone());

        tracing::debug!(
            chatbot_id = %id,
            transcript_len = transcript.len(),
            "Message answered"
        );
        Ok(Exchange {
            user_message,
            reply,
        })
    }

    /// Snapshot of the chatbot's conversation.
    pub async fn transcript(&self, id: Uuid) -> Result<Transcript, ApiError> {
        let entry = self.entry(id)?;
        let transcript = entry.transcript.lock().await;
        Ok(transcript.clone())
    }

    /// Clear the chatbot's conversation.
    pub async fn reset_transcript(&self, id: Uuid) -> Result<(), ApiError> {
        let entry = self.entry(id)?;
        *entry.transcript.lock().await = Transcript::new();
        tracing::info!(chatbot_id = %id, "Conversation reset");
        Ok(())
    }

    /// HTML snippet that embeds the chatbot widget on a website.
    pub fn embed_snippet(&self, id: Uuid) -> Result<String, ApiError> {
        self.entry(id)?;
        Ok(format!(
            "<script src=\"{}\" data-chatbot-id=\"{}\" async defer></script>",
            self.chat.embed_script_url, id
        ))
    }
}
