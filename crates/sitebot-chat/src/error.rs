//! Error types for the conversational interface.

use std::time::Duration;

/// Errors from message validation and the generation provider.
///
/// None of these reach the end user: `ResponseOrchestrator::respond` turns
/// every provider error into the fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("provider credentials are not configured")]
    MissingCredentials,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

impl ChatError {
    /// Whether the error was caused by the caller's input rather than the provider.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ChatError::Malformed(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}
