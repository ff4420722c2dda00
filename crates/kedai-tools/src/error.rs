//! Error types for the external tool layer.

use kedai_core::KedaiError;

/// Errors from tool implementations.
///
/// The orchestrator's dispatcher absorbs every variant into a fallback
/// reply; nothing here is allowed to surface as a transport-level fault.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool call timed out after {0} ms")]
    Timeout(u64),
    #[error("tool unavailable: {0}")]
    Unavailable(String),
    #[error("no results matched")]
    NoResults,
    #[error("division by zero")]
    DivisionByZero,
    #[error("malformed expression: {0}")]
    MalformedExpression(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl From<ToolError> for KedaiError {
    fn from(err: ToolError) -> Self {
        KedaiError::Tool(err.to_string())
    }
}
