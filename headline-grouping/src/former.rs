//! First-level group formation
//!
//! Two phases: a cheap greedy pass ([`form_groups`]) that may leave
//! overlapping candidate groups, then [`crate::reconcile`] to close them into
//! a [`Partition`].

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::error::{GroupingError, Result};
use crate::reconcile::merge_overlapping;
use crate::similarity::{ScoredPair, SimilarityEngine};

/// Title indices found similar in one pass; may overlap other groups
pub type CandidateGroup = BTreeSet<usize>;

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(-1.0..=1.0).contains(&threshold) {
        return Err(GroupingError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Pairs at or above `threshold`, by descending score then `(i, j)`
fn ordered_pairs(scores: &[ScoredPair], threshold: f64) -> Vec<ScoredPair> {
    let mut pairs: Vec<ScoredPair> = scores
        .iter()
        .filter(|p| p.score >= threshold)
        .copied()
        .collect();
    pairs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a.i, a.j).cmp(&(b.i, b.j)))
    });
    pairs
}

/// Greedy candidate groups from scored pairs
///
/// For each qualifying pair, in a fixed order: if `i` already joined a group
/// `j` is added to it, else if `j` joined a group `i` is added to it, else
/// `{i, j}` starts a new group. An index keeps the first group it joined, so
/// a pair bridging two existing groups leaves them overlapping for the
/// reconciler to merge.
pub fn form_groups(scores: &[ScoredPair], threshold: f64) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    let mut joined: HashMap<usize, usize> = HashMap::new();

    for pair in ordered_pairs(scores, threshold) {
        match (joined.get(&pair.i).copied(), joined.get(&pair.j).copied()) {
            (Some(gi), _) => {
                groups[gi].insert(pair.j);
                joined.entry(pair.j).or_insert(gi);
            }
            (None, Some(gj)) => {
                groups[gj].insert(pair.i);
                joined.insert(pair.i, gj);
            }
            (None, None) => {
                let id = groups.len();
                groups.push([pair.i, pair.j].into_iter().collect());
                joined.insert(pair.i, id);
                joined.insert(pair.j, id);
            }
        }
    }

    debug!(
        "Formed {} candidate groups at threshold {}",
        groups.len(),
        threshold
    );
    groups
}

/// Disjoint groups of title indices, each at least `min_size` long
///
/// Groups are sorted internally and ordered by their lowest index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Close candidate groups into a partition and drop small groups
    pub fn from_candidates(candidates: Vec<CandidateGroup>, min_size: usize) -> Self {
        let groups = merge_overlapping(candidates)
            .into_iter()
            .filter(|g| g.len() >= min_size)
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every title index that made it into some group
    pub fn members(&self) -> BTreeSet<usize> {
        self.groups.iter().flatten().copied().collect()
    }

    pub fn into_groups(self) -> Vec<Vec<usize>> {
        self.groups
    }
}

/// Score all titles and partition them into first-level groups
///
/// Titles with no peer at or above `threshold` are left out.
pub fn group_similar_titles(
    titles: &[String],
    engine: &dyn SimilarityEngine,
    threshold: f64,
    min_size: usize,
) -> Result<Partition> {
    validate_threshold(threshold)?;
    if titles.len() < 2 {
        return Ok(Partition::default());
    }

    let matrix = engine.similarity_matrix(titles)?;
    let candidates = form_groups(&matrix.pairwise_scores(), threshold);
    let partition = Partition::from_candidates(candidates, min_size.max(2));

    info!(
        "Grouped {} titles into {} groups using {} similarity ({} titles grouped)",
        titles.len(),
        partition.len(),
        engine.name(),
        partition.members().len()
    );
    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityMatrix;

    fn pair(i: usize, j: usize, score: f64) -> ScoredPair {
        ScoredPair { i, j, score }
    }

    struct MatrixEngine(SimilarityMatrix);

    impl SimilarityEngine for MatrixEngine {
        fn similarity_matrix(&self, _texts: &[String]) -> Result<SimilarityMatrix> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_form_groups_basic_scenario() {
        let scores = vec![pair(0, 1, 0.8), pair(0, 2, 0.3), pair(1, 2, 0.2)];
        let groups = form_groups(&scores, 0.7);
        assert_eq!(groups, vec![[0, 1].into_iter().collect::<CandidateGroup>()]);
    }

    #[test]
    fn test_form_groups_threshold_is_inclusive() {
        let groups = form_groups(&[pair(0, 1, 0.7)], 0.7);
        assert_eq!(groups.len(), 1);

        let groups = form_groups(&[pair(0, 1, 0.6999)], 0.7);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_form_groups_extends_existing_group() {
        let scores = vec![pair(0, 1, 0.9), pair(1, 2, 0.8), pair(3, 0, 0.75)];
        let groups = form_groups(&scores, 0.7);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], [0, 1, 2, 3].into_iter().collect());
    }

    #[test]
    fn test_form_groups_defers_cross_group_merge() {
        // {0,1} and {2,3} form first; the weaker 1-2 link only adds 2 to
        // group {0,1}, leaving both groups overlapping on 2
        let scores = vec![pair(0, 1, 0.95), pair(2, 3, 0.9), pair(1, 2, 0.8)];
        let groups = form_groups(&scores, 0.7);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], [0, 1, 2].into_iter().collect());
        assert_eq!(groups[1], [2, 3].into_iter().collect());

        let partition = Partition::from_candidates(groups, 2);
        assert_eq!(partition.groups(), &[vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_form_groups_order_independent_of_input_order() {
        let forward = vec![pair(0, 1, 0.9), pair(2, 3, 0.9), pair(1, 2, 0.8)];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(form_groups(&forward, 0.7), form_groups(&backward, 0.7));
    }

    #[test]
    fn test_group_similar_titles_excludes_singletons() {
        let engine = MatrixEngine(
            SimilarityMatrix::from_rows(vec![
                vec![1.0, 0.8, 0.3],
                vec![0.8, 1.0, 0.2],
                vec![0.3, 0.2, 1.0],
            ])
            .unwrap(),
        );
        let partition = group_similar_titles(
            &titles(&[
                "Apple launches new iPhone",
                "Apple announces iPhone release",
                "Tesla stock rises",
            ]),
            &engine,
            0.7,
            2,
        )
        .unwrap();

        assert_eq!(partition.groups(), &[vec![0, 1]]);
        assert!(!partition.members().contains(&2));
    }

    #[test]
    fn test_group_similar_titles_no_groups() {
        let engine = MatrixEngine(
            SimilarityMatrix::from_rows(vec![
                vec![1.0, 0.3, 0.2],
                vec![0.3, 1.0, 0.4],
                vec![0.2, 0.4, 1.0],
            ])
            .unwrap(),
        );
        let partition =
            group_similar_titles(&titles(&["a", "b", "c"]), &engine, 0.7, 2).unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn test_group_similar_titles_single_title() {
        let engine = MatrixEngine(SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap());
        let partition =
            group_similar_titles(&titles(&["Single news title"]), &engine, 0.7, 2).unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn test_min_size_drops_small_groups() {
        let candidates = vec![
            [0, 1].into_iter().collect(),
            [2, 3, 4].into_iter().collect(),
        ];
        let partition = Partition::from_candidates(candidates, 3);
        assert_eq!(partition.groups(), &[vec![2, 3, 4]]);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let engine = MatrixEngine(SimilarityMatrix::from_rows(vec![]).unwrap());
        let result = group_similar_titles(&titles(&["a", "b"]), &engine, 1.5, 2);
        assert!(matches!(result, Err(GroupingError::InvalidThreshold(_))));
    }
}
