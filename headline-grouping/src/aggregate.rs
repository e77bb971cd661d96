//! Second-level clustering of first-level groups into topics

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::former::{form_groups, validate_threshold};
use crate::normalize::normalize;
use crate::reconcile::merge_overlapping;
use crate::similarity::SimilarityEngine;

/// A set of first-level group ids judged contextually related
///
/// Ids index into the group slice passed to [`aggregate`]. A cluster with a
/// single group is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCluster {
    pub groups: Vec<usize>,
}

impl TopicCluster {
    pub fn singleton(group: usize) -> Self {
        Self {
            groups: vec![group],
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Title indices of every member group, in group order
    pub fn title_indices(&self, groups: &[Vec<usize>]) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|&g| groups[g].iter().copied())
            .collect()
    }
}

/// Text standing in for a whole group when comparing groups
///
/// The member titles are concatenated and normalized, so the engine sees
/// cleaned tokens without stopwords.
pub fn group_representation(group: &[usize], titles: &[String]) -> String {
    let joined = group
        .iter()
        .map(|&idx| titles[idx].as_str())
        .collect::<Vec<_>>()
        .join(" ");

    normalize(&joined, None)
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cluster first-level groups into topics
///
/// Every group lands in exactly one cluster. Clusters are ordered by their
/// lowest group id.
pub fn aggregate(
    groups: &[Vec<usize>],
    titles: &[String],
    engine: &dyn SimilarityEngine,
    context_threshold: f64,
) -> Result<Vec<TopicCluster>> {
    validate_threshold(context_threshold)?;
    if groups.len() < 2 {
        return Ok((0..groups.len()).map(TopicCluster::singleton).collect());
    }

    let representations: Vec<String> = groups
        .iter()
        .map(|g| group_representation(g, titles))
        .collect();
    let matrix = engine.similarity_matrix(&representations)?;
    let candidates = form_groups(&matrix.pairwise_scores(), context_threshold);

    let mut clusters = merge_overlapping(candidates);
    let matched: BTreeSet<usize> = clusters.iter().flatten().copied().collect();
    debug!(
        "{} of {} groups matched another group at context threshold {}",
        matched.len(),
        groups.len(),
        context_threshold
    );

    clusters.extend((0..groups.len()).filter(|g| !matched.contains(g)).map(|g| vec![g]));
    clusters.sort();

    info!(
        "Aggregated {} groups into {} topic clusters",
        groups.len(),
        clusters.len()
    );
    Ok(clusters
        .into_iter()
        .map(|groups| TopicCluster { groups })
        .collect())
}
