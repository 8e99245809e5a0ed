//! Error types for the DHT backing store.

use thiserror::Error;

/// Result type alias using the storage error type.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors surfaced by identifier derivation, the value codec and the store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A mutating operation was attempted on an observe-only store.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Malformed or unrecognized payload text.
    #[error("Syntax error: {message}: {fragment}")]
    Syntax { message: String, fragment: String },

    /// The DHT put/get/barrier failed or timed out.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Bad storage URI or setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Create a syntax error, keeping the offending input.
    pub fn syntax(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    /// Create a transport error from anything printable.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Observe-only rejection for the named operation.
    pub fn observing_only(operation: &str) -> Self {
        Self::PolicyViolation(format!("DHT node is only observing, refusing {}", operation))
    }

    /// Whether this is a malformed-payload error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
