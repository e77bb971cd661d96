//! Error types for grouping operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GroupingError>;

#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("Sentence encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("Sentence encoder failed: {0}")]
    Encoder(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Encoder returned {actual} embeddings for {expected} texts")]
    EmbeddingCount { expected: usize, actual: usize },

    #[error("Invalid threshold {0}: must lie in [-1, 1]")]
    InvalidThreshold(f64),

    #[error("Invalid grouping configuration: {0}")]
    InvalidConfig(String),
}
