//! Error types for Colloquy operations

use std::time::Duration;

/// Result type for Colloquy operations
pub type Result<T> = std::result::Result<T, ColloquyError>;

/// Error types for the conversation core and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum ColloquyError {
    /// Profile is missing its endpoint or API key
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// User message was empty after trimming
    #[error("Message is empty")]
    EmptyInput,

    /// No profile stored under this name
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Model client failure (network, auth, quota, empty reply)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model call did not finish in time
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Profile store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ColloquyError {
    /// Whether this is a local input validation failure.
    ///
    /// Precondition failures are reported to the caller as-is and are never
    /// worth retrying.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ColloquyError::InvalidProfile(_) | ColloquyError::EmptyInput)
    }
}
