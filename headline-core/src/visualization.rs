//! The published three-level grouping and its metadata sidecar
//!
//! Shape: `{ topic_label: { sub_label: { title: Article } } }`. Keys keep
//! insertion order so identical input produces byte-identical JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::news::Article;

/// Version of the public visualization contract
pub const VISUALIZATION_VERSION: &str = "0.2.1";

/// Articles of one first-level group keyed by title
pub type ArticleMap = IndexMap<String, Article>;

/// Sub-topics of one topic keyed by sub label
pub type SubTopicMap = IndexMap<String, ArticleMap>;

/// A sub label that was written twice under the same topic label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCollision {
    pub topic_label: String,
    pub sub_label: String,
    /// Titles of the group that got overwritten
    pub overwritten_titles: Vec<String>,
}

/// A topic label produced by more than one topic cluster
///
/// The later cluster's groups are merged under the existing topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCollision {
    pub topic_label: String,
    /// Titles of the cluster merged into the existing topic
    pub merged_titles: Vec<String>,
}

/// Nested topic -> sub-topic -> title -> article mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Visualization {
    topics: IndexMap<String, SubTopicMap>,
}

impl Visualization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the sub-topic map for a topic label, creating it if absent
    pub fn topic_entry(&mut self, topic_label: &str) -> &mut SubTopicMap {
        self.topics.entry(topic_label.to_string()).or_default()
    }

    /// Start a topic for one cluster
    ///
    /// Returns a collision when another cluster already claimed the label.
    /// The topic stays shared, so the caller's groups still land under it.
    pub fn open_topic(
        &mut self,
        topic_label: &str,
        cluster_titles: Vec<String>,
    ) -> Option<TopicCollision> {
        if !self.topics.contains_key(topic_label) {
            self.topics.insert(topic_label.to_string(), SubTopicMap::new());
            return None;
        }

        warn!(
            "Topic label collision: '{}' reused by a cluster of {} titles",
            topic_label,
            cluster_titles.len()
        );
        Some(TopicCollision {
            topic_label: topic_label.to_string(),
            merged_titles: cluster_titles,
        })
    }

    /// Insert a whole group under `topic_label` / `sub_label`
    ///
    /// The topic level is created on demand. An existing group under the
    /// same sub label is replaced; the replaced group is reported back as a
    /// collision rather than merged.
    pub fn insert_group(
        &mut self,
        topic_label: &str,
        sub_label: &str,
        articles: ArticleMap,
    ) -> Option<LabelCollision> {
        let previous = self
            .topic_entry(topic_label)
            .insert(sub_label.to_string(), articles)?;

        let collision = LabelCollision {
            topic_label: topic_label.to_string(),
            sub_label: sub_label.to_string(),
            overwritten_titles: previous.into_keys().collect(),
        };
        warn!(
            "Label collision under '{}': sub label '{}' overwrote {} titles",
            collision.topic_label,
            collision.sub_label,
            collision.overwritten_titles.len()
        );
        Some(collision)
    }

    /// Insert a single article, creating both intermediate levels on demand
    pub fn insert_article(&mut self, topic_label: &str, sub_label: &str, article: Article) {
        self.topic_entry(topic_label)
            .entry(sub_label.to_string())
            .or_default()
            .insert(article.title.clone(), article);
    }

    pub fn get(&self, topic_label: &str) -> Option<&SubTopicMap> {
        self.topics.get(topic_label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SubTopicMap)> {
        self.topics.iter()
    }

    /// Number of topic labels
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Total number of articles across all levels
    pub fn article_count(&self) -> usize {
        self.topics
            .values()
            .flat_map(|subs| subs.values())
            .map(|articles| articles.len())
            .sum()
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Metadata sidecar published with every snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Local time, second precision, no timezone suffix
    pub datetime: String,
    /// `major.minor.patch` of the visualization contract
    pub version: String,
}

impl SnapshotMetadata {
    pub fn new(datetime: impl Into<String>) -> Self {
        Self {
            datetime: datetime.into(),
            version: VISUALIZATION_VERSION.to_string(),
        }
    }

    /// Check that `version` is a `major.minor.patch` triple
    pub fn validate(&self) -> CoreResult<()> {
        let parts: Vec<&str> = self.version.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.parse::<u32>().is_err()) {
            return Err(CoreError::invalid_version(self.version.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            link: format!("https://example.com/{}", title.len()),
            timestamp: "Sat, 23 Nov 2024 14:30:00 +0000".to_string(),
            source: "https://example.com/rss".to_string(),
        }
    }

    fn group(titles: &[&str]) -> ArticleMap {
        titles.iter().map(|t| (t.to_string(), article(t))).collect()
    }

    #[test]
    fn test_insert_group_creates_levels() {
        let mut viz = Visualization::new();
        assert!(viz
            .insert_group("technology news", "ai developments", group(&["New AI model"]))
            .is_none());

        assert_eq!(viz.len(), 1);
        assert!(viz.get("technology news").unwrap().contains_key("ai developments"));
        assert_eq!(viz.article_count(), 1);
    }

    #[test]
    fn test_insert_group_reports_collision() {
        let mut viz = Visualization::new();
        viz.insert_group("topic", "same", group(&["first a", "first b"]));
        let collision = viz
            .insert_group("topic", "same", group(&["second"]))
            .expect("second insert should collide");

        assert_eq!(collision.overwritten_titles, vec!["first a", "first b"]);
        // Later group wins
        let sub = &viz.get("topic").unwrap()["same"];
        assert!(sub.contains_key("second"));
        assert!(!sub.contains_key("first a"));
    }

    #[test]
    fn test_same_topic_label_shares_namespace() {
        let mut viz = Visualization::new();
        viz.insert_group("topic", "one", group(&["a"]));
        assert!(viz.insert_group("topic", "two", group(&["b"])).is_none());
        assert_eq!(viz.get("topic").unwrap().len(), 2);
    }

    #[test]
    fn test_open_topic_reports_reused_label() {
        let mut viz = Visualization::new();
        assert!(viz.open_topic("markets", vec!["first".to_string()]).is_none());
        viz.insert_group("markets", "stocks", group(&["first"]));

        let collision = viz
            .open_topic("markets", vec!["second a".to_string(), "second b".to_string()])
            .expect("reused topic label should collide");
        assert_eq!(collision.topic_label, "markets");
        assert_eq!(collision.merged_titles, vec!["second a", "second b"]);

        // Existing groups under the topic are kept
        assert_eq!(viz.len(), 1);
        assert!(viz.get("markets").unwrap().contains_key("stocks"));
    }

    #[test]
    fn test_serializes_three_levels_in_insertion_order() {
        let mut viz = Visualization::new();
        viz.insert_article("zeta", "sub", article("Z title"));
        viz.insert_article("alpha", "sub", article("A title"));

        let json = serde_json::to_string(&viz).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["zeta"]["sub"]["Z title"]["title"], "Z title");
    }

    #[test]
    fn test_metadata_version() {
        let meta = SnapshotMetadata::new("2025-01-16T10:30:45");
        assert_eq!(meta.version, VISUALIZATION_VERSION);
        assert!(meta.validate().is_ok());

        let bad = SnapshotMetadata {
            datetime: "2025-01-16T10:30:45".to_string(),
            version: "0.2".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
