//! Error types for the run pipeline

use thiserror::Error;

use headline_core::CoreError;
use headline_feed::FeedError;
use headline_grouping::GroupingError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Grouping(#[from] GroupingError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
