//! Error types for the conversation orchestrator.

use kedai_core::KedaiError;

/// Errors from the orchestrator surface.
///
/// Conditions arising from user input never show up here; they resolve to a
/// reply (clarification, follow-up, or fallback). These variants are
/// transport-level guards and programming faults only.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("utterance exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<KedaiError> for ChatError {
    fn from(err: KedaiError) -> Self {
        ChatError::Internal(err.to_string())
    }
}

impl From<ChatError> for KedaiError {
    fn from(err: ChatError) -> Self {
        KedaiError::Chat(err.to_string())
    }
}
