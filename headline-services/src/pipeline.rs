//! Run pipeline
//!
//! One run loads the configured feeds, groups their titles, writes a local
//! snapshot and optionally publishes it to S3. The daemon repeats runs on a
//! fixed wait.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{error, info, instrument};

use headline_feed::{build_title_data, load_rss_sources, FeedClient};
use headline_grouping::{
    build_visualization, CommonSubstringLabeler, KeywordLabeler, LabelStrategy, Labeler,
    LexicalSimilarity, SemanticSimilarity, SimilarityEngine, StopwordChunker, VisualizationBuild,
};

use crate::config::{PipelineConfig, SimilarityStrategy};
use crate::encoder::OpenAiEncoder;
use crate::error::{Result, ServiceError};
use crate::snapshot::{current_datetime, LocalSnapshotWriter, S3Publisher, Snapshot, WrittenFiles};

/// What a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub datetime: String,
    /// Titles loaded from the feeds
    pub titles: usize,
    pub groups: usize,
    pub topics: usize,
    /// Articles in the published visualization
    pub articles: usize,
    pub collisions: usize,
    pub topic_collisions: usize,
    pub files: WrittenFiles,
    pub published: bool,
    pub elapsed_ms: u128,
}

fn labeler_for(strategy: LabelStrategy) -> Box<dyn Labeler> {
    match strategy {
        LabelStrategy::CommonSubstring => Box::new(CommonSubstringLabeler::default()),
        LabelStrategy::Keywords => Box::new(KeywordLabeler::new(StopwordChunker)),
    }
}

/// Run the pipeline once
#[instrument(skip(config, rss_file), fields(rss_file = %rss_file.display()))]
pub async fn run(config: &PipelineConfig, rss_file: &Path, s3: bool) -> Result<RunSummary> {
    config.validate()?;
    let started = Instant::now();

    // Fail before any fetching if the selected encoder cannot work
    let encoder = match config.similarity_strategy {
        SimilarityStrategy::Semantic => Some(OpenAiEncoder::from_env(Handle::current())?),
        SimilarityStrategy::Lexical => None,
    };
    // Bucket settings are checked up front for the same reason
    let publisher = if s3 {
        Some(S3Publisher::from_config(config).await?)
    } else {
        None
    };

    let sources = load_rss_sources(rss_file)?;
    let client = FeedClient::new();
    let loaded = build_title_data(
        &sources,
        &client,
        config.date_range_days,
        Local::now().date_naive(),
    )
    .await;
    let title_data = loaded.title_data;
    let titles = title_data.len();

    let grouping = config.grouping();
    let label_strategy = config.label_strategy;
    let build = tokio::task::spawn_blocking(move || -> Result<VisualizationBuild> {
        let engine: Box<dyn SimilarityEngine> = match encoder {
            Some(encoder) => Box::new(SemanticSimilarity::new(encoder)),
            None => Box::new(LexicalSimilarity::new()),
        };
        let labeler = labeler_for(label_strategy);
        info!(
            "Grouping {} titles (similarity: {}, labels: {})",
            title_data.len(),
            engine.name(),
            labeler.name()
        );
        Ok(build_visualization(
            &title_data,
            &grouping,
            engine.as_ref(),
            labeler.as_ref(),
        )?)
    })
    .await
    .map_err(|e| ServiceError::Task(e.to_string()))??;

    let datetime = current_datetime();
    let snapshot = Snapshot::new(&build, &datetime, config.debug)?;
    let writer = LocalSnapshotWriter::new(&config.output_dir);
    let mut files = writer.write(&snapshot).await?;
    if config.debug {
        files.entries = Some(writer.write_entries(&loaded.entries, &datetime).await?);
    }

    if let Some(publisher) = &publisher {
        publisher.publish(&snapshot).await?;
    }

    let summary = RunSummary {
        datetime,
        titles,
        groups: build.groups.len(),
        topics: build.topics.len(),
        articles: build.visualization.article_count(),
        collisions: build.collisions.len(),
        topic_collisions: build.topic_collisions.len(),
        files,
        published: publisher.is_some(),
        elapsed_ms: started.elapsed().as_millis(),
    };
    info!(
        "Run complete: {} titles -> {} groups in {} topics ({} ms)",
        summary.titles, summary.groups, summary.topics, summary.elapsed_ms
    );
    Ok(summary)
}

/// Run forever, waiting `daemon_wait_minutes` between runs
///
/// A failed run is logged and the loop carries on. Returns on Ctrl+C.
pub async fn run_daemon(config: &PipelineConfig, rss_file: PathBuf, s3: bool) -> Result<()> {
    config.validate()?;
    let wait = config.daemon_wait()?;

    loop {
        match run(config, &rss_file, s3).await {
            Ok(summary) => info!(
                "Latest run: {} ({} groups, {} topics)",
                summary.datetime, summary.groups, summary.topics
            ),
            Err(e) => error!("Run failed: {}", e),
        }

        info!("waiting for {} seconds", wait.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down daemon");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rss(titles: &[&str]) -> String {
        let date = Utc::now().to_rfc2822();
        let items: String = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    "<item><title>{}</title><link>https://news.example.com/{}</link><pubDate>{}</pubDate></item>",
                    title, i, date
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test News</title><link>https://news.example.com</link><description>Test</description>{}</channel></rss>"#,
            items
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_end_to_end_with_local_feed() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feed.xml");
        std::fs::write(
            &feed_path,
            rss(&[
                "Fed cuts interest rates again",
                "Fed cuts interest rates by half a point",
                "Tesla stock rises after strong earnings",
                "Tesla stock rises on earnings beat",
                "Local bakery wins national award",
            ]),
        )
        .unwrap();
        let rss_file = dir.path().join("rss.txt");
        std::fs::write(&rss_file, format!("{}\n", feed_path.display())).unwrap();

        let config = PipelineConfig {
            output_dir: dir.path().join("snapshots"),
            ..Default::default()
        };
        let summary = run(&config, &rss_file, false).await.unwrap();

        assert_eq!(summary.titles, 5);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.articles, 4);
        assert!(!summary.published);
        assert!(summary.files.groups.is_none());
        assert!(summary.files.entries.is_none());

        let latest = std::fs::read_to_string(&summary.files.latest).unwrap();
        let visualization: serde_json::Value = serde_json::from_str(&latest).unwrap();
        assert!(visualization.as_object().is_some_and(|topics| !topics.is_empty()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_debug_writes_entries_dump() {
        let dir = tempfile::tempdir().unwrap();
        let feed_path = dir.path().join("feed.xml");
        std::fs::write(
            &feed_path,
            rss(&[
                "Fed cuts interest rates again",
                "Fed cuts interest rates by half a point",
                "Local bakery wins national award",
            ]),
        )
        .unwrap();
        let rss_file = dir.path().join("rss.txt");
        std::fs::write(&rss_file, format!("{}\n", feed_path.display())).unwrap();

        let config = PipelineConfig {
            output_dir: dir.path().join("snapshots"),
            debug: true,
            ..Default::default()
        };
        let summary = run(&config, &rss_file, false).await.unwrap();

        assert!(summary.files.groups.is_some());
        let entries_path = summary.files.entries.unwrap();
        assert!(entries_path.ends_with(format!("all_entries_{}.json", summary.datetime)));

        let dumped: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&entries_path).unwrap()).unwrap();
        let entries = dumped["Test News"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2]["title"], "Local bakery wins national award");
    }

    #[tokio::test]
    async fn test_run_missing_rss_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = run(&config, &dir.path().join("missing.txt"), false).await;
        assert!(matches!(result, Err(ServiceError::Feed(_))));
    }

    #[tokio::test]
    async fn test_run_with_s3_requires_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = run(&config, &dir.path().join("rss.txt"), true).await;
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
