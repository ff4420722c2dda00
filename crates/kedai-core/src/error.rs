use thiserror::Error;

/// Top-level error type for the Kedai system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for KedaiError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KedaiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for KedaiError {
    fn from(err: toml::de::Error) -> Self {
        KedaiError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KedaiError {
    fn from(err: toml::ser::Error) -> Self {
        KedaiError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for KedaiError {
    fn from(err: serde_json::Error) -> Self {
        KedaiError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Kedai operations.
pub type Result<T> = std::result::Result<T, KedaiError>;
