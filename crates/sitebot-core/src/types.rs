use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SitebotError};

// =============================================================================
// Chatbot profile
// =============================================================================

/// Creation form for a chatbot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatbot {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    pub knowledge_base: String,
}

/// One configured assistant.
///
/// `id` and `created_at` never change after creation. The knowledge base is
/// only ever replaced as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotProfile {
    pub id: Uuid,
    /// Display label, used verbatim in the grounding instruction.
    pub name: String,
    /// Advisory reference to the business website.
    pub website: Option<String>,
    /// Full text corpus the assistant must restrict itself to.
    pub knowledge_base: String,
    pub created_at: DateTime<Utc>,
}

impl ChatbotProfile {
    /// Build a profile from a creation form.
    ///
    /// Name and knowledge base are required; a blank website is stored as absent.
    pub fn create(form: NewChatbot) -> Result<Self> {
        if form.name.trim().is_empty() {
            return Err(SitebotError::Validation(
                "chatbot name is required".to_string(),
            ));
        }
        if form.knowledge_base.trim().is_empty() {
            return Err(SitebotError::Validation(
                "knowledge base is required".to_string(),
            ));
        }
        let website = form
            .website
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            name: form.name.trim().to_string(),
            website,
            knowledge_base: form.knowledge_base,
            created_at: Utc::now(),
        })
    }

    /// Replace the knowledge base with new text.
    pub fn replace_knowledge_base(&mut self, knowledge_base: String) -> Result<()> {
        if knowledge_base.trim().is_empty() {
            return Err(SitebotError::Validation(
                "knowledge base is required".to_string(),
            ));
        }
        self.knowledge_base = knowledge_base;
        Ok(())
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One message in a transcript. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
}

impl ConversationTurn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

/// Append-only, oldest-first sequence of turns.
///
/// Backed by an `Arc`, so clones are cheap snapshots: a clone taken before a
/// `push` never sees the appended turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Arc<Vec<ConversationTurn>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end.
    pub fn push(&mut self, turn: ConversationTurn) {
        Arc::make_mut(&mut self.turns).push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.turns.iter()
    }
}

impl From<Vec<ConversationTurn>> for Transcript {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self {
            turns: Arc::new(turns),
        }
    }
}

impl Serialize for Transcript {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.turns.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transcript {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        Vec::<ConversationTurn>::deserialize(deserializer).map(Transcript::from)
    }
}
