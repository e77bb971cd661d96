//! Snapshot publishing
//!
//! A snapshot is the visualization JSON plus its metadata sidecar. It is
//! serialized once and then written locally and, optionally, uploaded to S3.
//!
//! ## File layout
//! - `headlines_visualization_{version}_{datetime}.json`: versioned copy
//! - `latest_news.json`: same content under a stable name
//! - `latest_news_metadata.json`: `{datetime, version}`
//! - `headlines_groups_{datetime}.json`: first-level groups (debug only)
//! - `all_entries_{datetime}.json`: every kept feed entry by feed (debug only)

use std::path::PathBuf;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl, Client};
use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, instrument};

use headline_core::{SnapshotMetadata, VISUALIZATION_VERSION};
use headline_feed::FeedEntries;
use headline_grouping::VisualizationBuild;

use crate::config::PipelineConfig;
use crate::error::{Result, ServiceError};

pub const LATEST_NEWS_FILE: &str = "latest_news.json";
pub const LATEST_METADATA_FILE: &str = "latest_news_metadata.json";

/// Local time, second precision, no timezone suffix
pub fn current_datetime() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn visualization_file_name(datetime: &str) -> String {
    format!(
        "headlines_visualization_{}_{}.json",
        VISUALIZATION_VERSION, datetime
    )
}

pub fn groups_file_name(datetime: &str) -> String {
    format!("headlines_groups_{}.json", datetime)
}

pub fn entries_file_name(datetime: &str) -> String {
    format!("all_entries_{}.json", datetime)
}

/// Serialized output of one run
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub visualization_json: String,
    pub metadata_json: String,
    /// Present only when group dumps were requested
    pub groups_json: Option<String>,
}

impl Snapshot {
    pub fn new(build: &VisualizationBuild, datetime: &str, include_groups: bool) -> Result<Self> {
        let metadata = SnapshotMetadata::new(datetime);
        metadata.validate()?;

        let groups_json = if include_groups {
            Some(serde_json::to_string_pretty(&build.groups)?)
        } else {
            None
        };

        Ok(Self {
            visualization_json: build.visualization.to_json_pretty()?,
            metadata_json: serde_json::to_string_pretty(&metadata)?,
            metadata,
            groups_json,
        })
    }

    pub fn visualization_file_name(&self) -> String {
        visualization_file_name(&self.metadata.datetime)
    }

    pub fn groups_file_name(&self) -> String {
        groups_file_name(&self.metadata.datetime)
    }
}

/// Paths written by [`LocalSnapshotWriter`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct WrittenFiles {
    pub visualization: PathBuf,
    pub latest: PathBuf,
    pub metadata: PathBuf,
    pub groups: Option<PathBuf>,
    pub entries: Option<PathBuf>,
}

/// Writes snapshots under a local directory
pub struct LocalSnapshotWriter {
    output_dir: PathBuf,
}

impl LocalSnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    async fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Write every file of the snapshot, creating the directory if needed
    #[instrument(skip(self, snapshot), fields(dir = %self.output_dir.display()))]
    pub async fn write(&self, snapshot: &Snapshot) -> Result<WrittenFiles> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let files = WrittenFiles {
            visualization: self
                .write_file(&snapshot.visualization_file_name(), &snapshot.visualization_json)
                .await?,
            latest: self
                .write_file(LATEST_NEWS_FILE, &snapshot.visualization_json)
                .await?,
            metadata: self
                .write_file(LATEST_METADATA_FILE, &snapshot.metadata_json)
                .await?,
            groups: match &snapshot.groups_json {
                Some(json) => Some(self.write_file(&snapshot.groups_file_name(), json).await?),
                None => None,
            },
            entries: None,
        };

        info!("Wrote snapshot {}", files.visualization.display());
        Ok(files)
    }

    /// Dump the loaded feed entries next to the snapshot
    #[instrument(skip(self, entries), fields(feeds = entries.len()))]
    pub async fn write_entries(&self, entries: &FeedEntries, datetime: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let json = serde_json::to_string_pretty(entries)?;
        let path = self.write_file(&entries_file_name(datetime), &json).await?;
        debug!("Wrote feed entries {}", path.display());
        Ok(path)
    }
}

/// Uploads snapshots to S3
///
/// The versioned file goes to the private bucket; `latest_news.json` and its
/// metadata go to the public bucket with a public-read ACL.
pub struct S3Publisher {
    client: Client,
    private_bucket: String,
    public_bucket: String,
}

impl S3Publisher {
    /// Create a publisher from the configured buckets
    ///
    /// Requires AWS credentials to be configured via environment variables:
    /// - AWS_ACCESS_KEY_ID
    /// - AWS_SECRET_ACCESS_KEY
    /// - AWS_REGION
    pub async fn from_config(config: &PipelineConfig) -> Result<Self> {
        let private_bucket = config
            .s3_bucket
            .clone()
            .ok_or_else(|| ServiceError::config("HEADLINES_S3_BUCKET is not set"))?;
        let public_bucket = config
            .s3_public_bucket
            .clone()
            .ok_or_else(|| ServiceError::config("HEADLINES_S3_PUBLIC_BUCKET is not set"))?;

        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let client = Client::new(&aws_config);

        info!(
            "S3 publisher initialized (private: {}, public: {})",
            private_bucket, public_bucket
        );
        Ok(Self {
            client,
            private_bucket,
            public_bucket,
        })
    }

    #[instrument(skip(self, snapshot), fields(datetime = %snapshot.metadata.datetime))]
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        self.put_object(
            &self.private_bucket,
            &snapshot.visualization_file_name(),
            &snapshot.visualization_json,
            None,
        )
        .await?;
        self.put_object(
            &self.public_bucket,
            LATEST_NEWS_FILE,
            &snapshot.visualization_json,
            Some(ObjectCannedAcl::PublicRead),
        )
        .await?;
        self.put_object(
            &self.public_bucket,
            LATEST_METADATA_FILE,
            &snapshot.metadata_json,
            Some(ObjectCannedAcl::PublicRead),
        )
        .await?;

        info!(
            "Published snapshot to s3://{} and s3://{}",
            self.private_bucket, self.public_bucket
        );
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        acl: Option<ObjectCannedAcl>,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.as_bytes().to_vec()))
            .content_type("application/json")
            .set_acl(acl)
            .send()
            .await
            .map_err(|e| ServiceError::storage(format!("S3 put error for {}/{}: {}", bucket, key, e)))?;
        Ok(())
    }
}
