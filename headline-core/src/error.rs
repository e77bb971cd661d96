//! Error types shared across the headline crates

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),
}

impl CoreError {
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        CoreError::InvalidVersion(msg.into())
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
