//! Error types for scope storage and validation

use thiserror::Error;

/// Scope errors
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A scope with this ID is already stored
    #[error("Scope already exists: {0}")]
    AlreadyExists(String),

    /// Policy string is not one of the known policies
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Embedded storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScopeError {
    /// Whether this error reports a duplicate scope ID
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ScopeError::AlreadyExists(_))
    }
}

impl From<serde_json::Error> for ScopeError {
    fn from(err: serde_json::Error) -> Self {
        ScopeError::Serialization(err.to_string())
    }
}

/// Result type for scope operations
pub type Result<T> = std::result::Result<T, ScopeError>;
