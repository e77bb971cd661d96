//! Set reconciliation
//!
//! General-purpose utilities that turn a bag of possibly-overlapping index
//! sets into a partition. Groups come back as sorted `Vec<usize>` in
//! lexicographic order, so equal inputs always give equal outputs.

use std::collections::BTreeSet;

use tracing::debug;

type Group = BTreeSet<usize>;

fn collect_groups<I, G>(groups: I) -> Vec<Group>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = usize>,
{
    groups
        .into_iter()
        .map(|g| g.into_iter().collect())
        .collect()
}

/// Sorted multiset of sorted groups, used to detect a fixed point
fn canonical(groups: &[Group]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = groups.iter().map(|g| g.iter().copied().collect()).collect();
    out.sort();
    out
}

/// Keep only maximal groups
///
/// A group that is a strict subset of another is dropped; duplicates
/// collapse to a single copy.
pub fn remove_strict_subsets<I, G>(groups: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = usize>,
{
    let unique: BTreeSet<Group> = collect_groups(groups).into_iter().collect();

    unique
        .iter()
        .filter(|candidate| {
            !unique
                .iter()
                .any(|other| other.len() > candidate.len() && candidate.is_subset(other))
        })
        .map(|g| g.iter().copied().collect())
        .collect()
}

/// One merging pass: every group absorbs each later group that overlaps
/// its growing union
fn merge_pass(groups: &[Group]) -> Vec<Group> {
    let mut consumed = vec![false; groups.len()];
    let mut merged = Vec::with_capacity(groups.len());

    for i in 0..groups.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let mut union = groups[i].clone();
        for j in (i + 1)..groups.len() {
            if !consumed[j] && !union.is_disjoint(&groups[j]) {
                union.extend(groups[j].iter().copied());
                consumed[j] = true;
            }
        }
        merged.push(union);
    }

    merged
}

/// Union overlapping groups until no two groups share a member
///
/// Repeats full passes until the sorted multiset of groups stops changing.
/// Each pass can only shrink the collection, so at most `n - 1` passes run.
pub fn merge_overlapping<I, G>(groups: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = usize>,
{
    let mut current: Vec<Group> = collect_groups(groups);
    current.sort();
    if current.is_empty() {
        return Vec::new();
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let mut next = merge_pass(&current);
        next.sort();
        next.dedup();
        if canonical(&next) == canonical(&current) {
            break;
        }
        current = next;
    }

    debug!("Merged overlapping groups in {} passes", passes);
    canonical(&current)
}

/// Merge overlaps, then drop non-maximal groups
///
/// The output is a partition and `reconcile(reconcile(g)) == reconcile(g)`.
pub fn reconcile<I, G>(groups: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = usize>,
{
    remove_strict_subsets(merge_overlapping(groups))
}

/// True if no index appears in more than one group
pub fn is_partition(groups: &[Vec<usize>]) -> bool {
    let mut seen = BTreeSet::new();
    groups
        .iter()
        .flat_map(|g| g.iter().collect::<BTreeSet<_>>())
        .all(|idx| seen.insert(*idx))
}
