//! Core types for the headline grouping pipeline
//!
//! This crate defines the shared data structures used across the workspace:
//! validated feed entries, the published visualization and its metadata.

pub mod error;
pub mod news;
pub mod visualization;

pub use error::{CoreError, CoreResult};
pub use news::{Article, NewsEntry, ParseOutcome};
pub use visualization::{
    ArticleMap, LabelCollision, SnapshotMetadata, SubTopicMap, TopicCollision, Visualization,
    VISUALIZATION_VERSION,
};
