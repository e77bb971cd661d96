//! Run pipeline and publishing for headline grouping
//!
//! This crate wires the feed loader and the grouping engine together:
//! configuration, the OpenAI sentence encoder, local and S3 snapshot
//! publishing, and the single-run and daemon entry points.

pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod snapshot;

pub use config::{PipelineConfig, SimilarityStrategy};
pub use encoder::{OpenAiEncoder, DEFAULT_EMBEDDING_MODEL};
pub use error::{Result, ServiceError};
pub use pipeline::{run, run_daemon, RunSummary};
pub use snapshot::{
    current_datetime, groups_file_name, visualization_file_name, LocalSnapshotWriter,
    S3Publisher, Snapshot, WrittenFiles, LATEST_METADATA_FILE, LATEST_NEWS_FILE,
};
