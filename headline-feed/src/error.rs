//! Error types for feed loading

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors that can occur while loading feeds
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Feed server returned an error response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Body was neither RSS nor Atom
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reading a local source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
