//! Conversational response orchestration for SiteBot.
//!
//! Turns a chatbot profile, a prior transcript and a new user message into
//! exactly one grounded reply, using a single call to an injected
//! generation provider.

pub mod error;
pub mod gemini;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use error::ChatError;
pub use gemini::GeminiProvider;
pub use history::{map_turns, HistoryWindow};
pub use orchestrator::{validate_message, ResponseOrchestrator, TRANSPORT_FALLBACK_REPLY};
pub use prompt::{build_system_instruction, KNOWLEDGE_BASE_MISS_REPLY};
pub use provider::{
    GenerationProvider, GenerationRequest, GenerationResponse, GenerationTurn, Role,
    ScriptedOutcome, ScriptedProvider,
};
