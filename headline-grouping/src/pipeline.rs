//! Full grouping pipeline: titles in, [`Visualization`] out

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use headline_core::{
    Article, ArticleMap, LabelCollision, NewsEntry, TopicCollision, Visualization,
};

use crate::aggregate::{TopicCluster, aggregate};
use crate::error::{GroupingError, Result};
use crate::former::{group_similar_titles, validate_threshold};
use crate::label::{Labeler, top_words};
use crate::similarity::SimilarityEngine;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_CONTEXT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CLUSTER_LIMIT: usize = 2;
const DEBUG_TOP_WORDS: usize = 50;

/// Title data keyed by title, in feed order
pub type TitleData = IndexMap<String, NewsEntry>;

/// Knobs for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Minimum score for two titles to share a group
    pub similarity_threshold: f64,
    /// Minimum score for two groups to share a topic
    pub context_threshold: f64,
    /// Minimum first-level group size
    pub cluster_limit: usize,
    /// Log word frequencies and group contents
    pub debug: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            context_threshold: DEFAULT_CONTEXT_THRESHOLD,
            cluster_limit: DEFAULT_CLUSTER_LIMIT,
            debug: false,
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.similarity_threshold)?;
        validate_threshold(self.context_threshold)?;
        if self.cluster_limit < 2 {
            return Err(GroupingError::InvalidConfig(format!(
                "cluster_limit must be at least 2, got {}",
                self.cluster_limit
            )));
        }
        Ok(())
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Default)]
pub struct VisualizationBuild {
    pub visualization: Visualization,
    /// First-level groups as titles, largest first
    pub groups: Vec<Vec<String>>,
    /// Topic clusters over the first-level groups
    pub topics: Vec<TopicCluster>,
    /// Sub labels that overwrote an earlier group
    pub collisions: Vec<LabelCollision>,
    /// Topic labels shared by more than one cluster
    pub topic_collisions: Vec<TopicCollision>,
}

fn titles_at<'a>(indices: &[usize], titles: &'a [String]) -> Vec<&'a str> {
    indices.iter().map(|&idx| titles[idx].as_str()).collect()
}

/// Group, aggregate and label `title_data`
///
/// Output key order follows title order, so equal input gives byte-identical
/// JSON. Titles without a similar peer are left out.
#[instrument(skip(title_data, config, engine, labeler), fields(titles = title_data.len()))]
pub fn build_visualization(
    title_data: &TitleData,
    config: &GroupingConfig,
    engine: &dyn SimilarityEngine,
    labeler: &dyn Labeler,
) -> Result<VisualizationBuild> {
    config.validate()?;
    let titles: Vec<String> = title_data.keys().cloned().collect();

    let partition = group_similar_titles(
        &titles,
        engine,
        config.similarity_threshold,
        config.cluster_limit,
    )?;
    let groups = partition.groups();

    if config.debug {
        let grouped: Vec<&str> = titles_at(&partition.members().into_iter().collect_vec(), &titles);
        for (word, count) in top_words(&grouped, DEBUG_TOP_WORDS) {
            debug!("{:>5}  {}", count, word);
        }
        for group in groups {
            debug!("Group: {:?}", titles_at(group, &titles));
        }
    }

    let topics = aggregate(groups, &titles, engine, config.context_threshold)?;

    let mut visualization = Visualization::new();
    let mut collisions = Vec::new();
    let mut topic_collisions = Vec::new();
    for topic in &topics {
        let cluster_titles = titles_at(&topic.title_indices(groups), &titles);
        let topic_label = labeler.label(&cluster_titles);
        let owned = cluster_titles.iter().map(|t| t.to_string()).collect();
        if let Some(collision) = visualization.open_topic(&topic_label, owned) {
            topic_collisions.push(collision);
        }
        for &group_id in &topic.groups {
            let group = &groups[group_id];
            let sub_label = labeler.label(&titles_at(group, &titles));

            let articles: ArticleMap = group
                .iter()
                .map(|&idx| {
                    let title = &titles[idx];
                    (title.clone(), Article::from(&title_data[title]))
                })
                .collect();

            if let Some(collision) = visualization.insert_group(&topic_label, &sub_label, articles) {
                collisions.push(collision);
            }
        }
    }

    if !collisions.is_empty() {
        warn!("{} groups lost to label collisions", collisions.len());
    }
    if !topic_collisions.is_empty() {
        warn!("{} clusters merged into another topic label", topic_collisions.len());
    }

    let group_titles: Vec<Vec<String>> = groups
        .iter()
        .sorted_by_key(|g| std::cmp::Reverse(g.len()))
        .map(|g| g.iter().map(|&idx| titles[idx].clone()).collect())
        .collect();

    info!(
        "Built visualization with {} topics, {} groups and {} articles ({} labels)",
        visualization.len(),
        groups.len(),
        visualization.article_count(),
        labeler.name()
    );

    Ok(VisualizationBuild {
        visualization,
        groups: group_titles,
        topics,
        collisions,
        topic_collisions,
    })
}
