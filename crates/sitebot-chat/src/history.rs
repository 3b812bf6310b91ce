//! Transcript-to-provider turn mapping.
//!
//! Maps prior conversation turns, in order, onto the provider's role-tagged
//! format and appends the new user message.

use sitebot_core::types::{ConversationTurn, Sender};

use crate::provider::{GenerationTurn, Role};

/// How much prior history is sent with each request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Resend the whole transcript every call.
    #[default]
    Unbounded,
    /// Keep at most the newest `n` prior turns, starting on a user turn.
    LastTurns(usize),
}

impl HistoryWindow {
    /// Build from the optional `chat.history_window` config value.
    pub fn from_config(window: Option<usize>) -> Self {
        match window {
            Some(n) => HistoryWindow::LastTurns(n),
            None => HistoryWindow::Unbounded,
        }
    }

    fn apply<'a>(&self, prior: &'a [ConversationTurn]) -> &'a [ConversationTurn] {
        match *self {
            HistoryWindow::Unbounded => prior,
            HistoryWindow::LastTurns(n) => {
                let tail = &prior[prior.len().saturating_sub(n)..];
                // A window opening on an assistant turn would split an exchange.
                let start = tail
                    .iter()
                    .position(|turn| turn.sender == Sender::User)
                    .unwrap_or(tail.len());
                &tail[start..]
            }
        }
    }
}

/// Provider role for a transcript sender.
pub fn role_for(sender: Sender) -> Role {
    match sender {
        Sender::User => Role::User,
        Sender::Assistant => Role::Model,
    }
}

/// Map prior turns plus the new message into provider turns.
///
/// Text is carried literally. The new message is always the final `user` turn.
pub fn map_turns(
    prior: &[ConversationTurn],
    new_user_text: &str,
    window: HistoryWindow,
) -> Vec<GenerationTurn> {
    let kept = window.apply(prior);
    let mut turns = Vec::with_capacity(kept.len() + 1);
    turns.extend(kept.iter().map(|turn| GenerationTurn {
        role: role_for(turn.sender),
        text: turn.text.clone(),
    }));
    turns.push(GenerationTurn::user(new_user_text));
    turns
}
