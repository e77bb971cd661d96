//! Pipeline configuration
//!
//! Every field can be set through a `HEADLINES_*` environment variable.
//! Unset variables fall back to the defaults below; set-but-malformed ones
//! are an error.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use headline_feed::DEFAULT_DATE_RANGE_DAYS;
use headline_grouping::pipeline::{
    DEFAULT_CLUSTER_LIMIT, DEFAULT_CONTEXT_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD,
};
use headline_grouping::{GroupingConfig, LabelStrategy};

use crate::error::{Result, ServiceError};

const ENV_PREFIX: &str = "HEADLINES_";

/// How title similarity is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityStrategy {
    /// TF-IDF over normalized tokens
    #[default]
    Lexical,
    /// OpenAI sentence embeddings
    Semantic,
}

impl fmt::Display for SimilarityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityStrategy::Lexical => f.write_str("lexical"),
            SimilarityStrategy::Semantic => f.write_str("semantic"),
        }
    }
}

impl FromStr for SimilarityStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "tfidf" => Ok(SimilarityStrategy::Lexical),
            "semantic" | "embedding" => Ok(SimilarityStrategy::Semantic),
            other => Err(format!("unknown similarity strategy '{}'", other)),
        }
    }
}

/// Configuration for one pipeline run (or a daemon of runs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum title similarity for grouping
    pub similarity_threshold: f64,
    /// Minimum group similarity for topic aggregation
    pub context_threshold: f64,
    /// Minimum first-level group size (at least 2)
    pub cluster_limit: usize,
    pub label_strategy: LabelStrategy,
    pub similarity_strategy: SimilarityStrategy,
    /// Entries older than this are dropped
    pub date_range_days: i64,
    /// Pause between daemon runs; fractions allowed
    pub daemon_wait_minutes: f64,
    pub debug: bool,
    /// Where local snapshots are written
    pub output_dir: PathBuf,
    /// Bucket for the versioned snapshot
    pub s3_bucket: Option<String>,
    /// Bucket for `latest_news*.json`
    pub s3_public_bucket: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            context_threshold: DEFAULT_CONTEXT_THRESHOLD,
            cluster_limit: DEFAULT_CLUSTER_LIMIT,
            label_strategy: LabelStrategy::default(),
            similarity_strategy: SimilarityStrategy::default(),
            date_range_days: DEFAULT_DATE_RANGE_DAYS,
            daemon_wait_minutes: 60.0,
            debug: false,
            output_dir: PathBuf::from("data/snapshots"),
            s3_bucket: None,
            s3_public_bucket: None,
        }
    }
}

impl PipelineConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            similarity_threshold: parse_var(
                &var,
                "SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            context_threshold: parse_var(&var, "CONTEXT_THRESHOLD", defaults.context_threshold)?,
            cluster_limit: parse_var(&var, "CLUSTER_LIMIT", defaults.cluster_limit)?,
            label_strategy: parse_var(&var, "LABEL_STRATEGY", defaults.label_strategy)?,
            similarity_strategy: parse_var(
                &var,
                "SIMILARITY_STRATEGY",
                defaults.similarity_strategy,
            )?,
            date_range_days: parse_var(&var, "DATE_RANGE_DAYS", defaults.date_range_days)?,
            daemon_wait_minutes: parse_var(
                &var,
                "DAEMON_WAIT_MINUTES",
                defaults.daemon_wait_minutes,
            )?,
            debug: parse_var(&var, "DEBUG", defaults.debug)?,
            output_dir: var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            s3_bucket: var("S3_BUCKET").or_else(|| lookup("AWS_S3_BUCKET")),
            s3_public_bucket: var("S3_PUBLIC_BUCKET")
                .or_else(|| lookup("AWS_S3_PUBLIC_BUCKET")),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grouping()
            .validate()
            .map_err(|e| ServiceError::config(e.to_string()))?;
        if self.date_range_days <= 0 {
            return Err(ServiceError::config(format!(
                "date_range_days must be positive, got {}",
                self.date_range_days
            )));
        }
        self.daemon_wait()?;
        Ok(())
    }

    /// Pause between daemon runs
    ///
    /// Fails for negative, non-finite, or unrepresentably large minutes.
    pub fn daemon_wait(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.daemon_wait_minutes * 60.0).map_err(|e| {
            ServiceError::config(format!(
                "daemon_wait_minutes must be a non-negative number of representable length, \
                 got {}: {}",
                self.daemon_wait_minutes, e
            ))
        })
    }

    /// The subset the grouping engine needs
    pub fn grouping(&self) -> GroupingConfig {
        GroupingConfig {
            similarity_threshold: self.similarity_threshold,
            context_threshold: self.context_threshold,
            cluster_limit: self.cluster_limit,
            debug: self.debug,
        }
    }
}

fn parse_var<T, V>(var: &V, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| {
            ServiceError::config(format!("{}{}='{}': {}", ENV_PREFIX, name, raw, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.similarity_threshold, 0.7);
        assert_eq!(config.context_threshold, 0.5);
        assert_eq!(config.date_range_days, 14);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("HEADLINES_SIMILARITY_THRESHOLD", "0.8"),
            ("HEADLINES_CLUSTER_LIMIT", "3"),
            ("HEADLINES_LABEL_STRATEGY", "keywords"),
            ("HEADLINES_SIMILARITY_STRATEGY", "semantic"),
            ("HEADLINES_DAEMON_WAIT_MINUTES", "0.5"),
            ("HEADLINES_DEBUG", "true"),
            ("HEADLINES_OUTPUT_DIR", "/tmp/out"),
            ("AWS_S3_BUCKET", "private-bucket"),
            ("HEADLINES_S3_PUBLIC_BUCKET", "public-bucket"),
        ]))
        .unwrap();

        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.cluster_limit, 3);
        assert_eq!(config.label_strategy, LabelStrategy::Keywords);
        assert_eq!(config.similarity_strategy, SimilarityStrategy::Semantic);
        assert_eq!(config.daemon_wait_minutes, 0.5);
        assert!(config.debug);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.s3_bucket.as_deref(), Some("private-bucket"));
        assert_eq!(config.s3_public_bucket.as_deref(), Some("public-bucket"));
    }

    #[test]
    fn test_malformed_value_is_error() {
        let err = PipelineConfig::from_lookup(lookup(&[("HEADLINES_CLUSTER_LIMIT", "two")]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
        assert!(err.to_string().contains("HEADLINES_CLUSTER_LIMIT"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for (key, value) in [
            ("HEADLINES_SIMILARITY_THRESHOLD", "1.2"),
            ("HEADLINES_CONTEXT_THRESHOLD", "-3"),
            ("HEADLINES_CLUSTER_LIMIT", "1"),
            ("HEADLINES_DATE_RANGE_DAYS", "0"),
            ("HEADLINES_DAEMON_WAIT_MINUTES", "-1"),
            ("HEADLINES_DAEMON_WAIT_MINUTES", "NaN"),
            ("HEADLINES_DAEMON_WAIT_MINUTES", "inf"),
            ("HEADLINES_DAEMON_WAIT_MINUTES", "1e300"),
        ] {
            assert!(
                PipelineConfig::from_lookup(lookup(&[(key, value)])).is_err(),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_daemon_wait() {
        let config = PipelineConfig {
            daemon_wait_minutes: 0.5,
            ..Default::default()
        };
        assert_eq!(config.daemon_wait().unwrap(), Duration::from_secs(30));

        let config = PipelineConfig {
            daemon_wait_minutes: 1e300,
            ..Default::default()
        };
        assert!(matches!(config.daemon_wait(), Err(ServiceError::Config(_))));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grouping_subset() {
        let config = PipelineConfig {
            cluster_limit: 4,
            debug: true,
            ..Default::default()
        };
        let grouping = config.grouping();
        assert_eq!(grouping.cluster_limit, 4);
        assert!(grouping.debug);
        assert_eq!(grouping.similarity_threshold, 0.7);
    }
}
