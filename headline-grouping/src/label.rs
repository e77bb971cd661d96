//! Human-readable labels for groups of titles
//!
//! Two strategies behind [`Labeler`]:
//! - [`CommonSubstringLabeler`]: longest substrings shared between titles
//! - [`KeywordLabeler`]: most frequent noun phrases and their heads, taken
//!   from an injected [`Annotator`]
//!
//! Labels are not unique. Two groups may end up with the same label and it
//! is up to the caller to notice.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::normalize::{clean_text, normalize};
use crate::stopwords::is_stopword;

pub const DEFAULT_MIN_SUBSTRING_LENGTH: usize = 3;
pub const DEFAULT_SUBSTRING_TERMS: usize = 3;
pub const DEFAULT_KEYWORD_TERMS: usize = 5;

/// Strategy that names a group of titles
pub trait Labeler {
    fn label(&self, titles: &[&str]) -> String;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStrategy {
    #[default]
    CommonSubstring,
    Keywords,
}

impl LabelStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelStrategy::CommonSubstring => "common_substring",
            LabelStrategy::Keywords => "keywords",
        }
    }
}

impl fmt::Display for LabelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "common_substring" | "substring" => Ok(LabelStrategy::CommonSubstring),
            "keywords" | "keyword" => Ok(LabelStrategy::Keywords),
            other => Err(format!("unknown label strategy '{}'", other)),
        }
    }
}

// ============================================================================
// Common substrings
// ============================================================================

/// Every substring of at least `min_length` chars shared by some pair of
/// titles, longest first, then lexical order
///
/// A single title has no pairs and yields nothing.
pub fn extract_common_substrings(titles: &[&str], min_length: usize) -> Vec<String> {
    ranked_substrings(titles, min_length, usize::MAX)
}

/// The first `limit` entries of [`extract_common_substrings`]
///
/// Stops as soon as `limit` substrings are known, so only the longest
/// lengths are ever enumerated.
pub fn top_common_substrings(titles: &[&str], min_length: usize, limit: usize) -> Vec<String> {
    ranked_substrings(titles, min_length, limit)
}

fn ranked_substrings(titles: &[&str], min_length: usize, limit: usize) -> Vec<String> {
    let min_length = min_length.max(1);
    let runs = maximal_runs(titles, min_length);
    let longest = runs.iter().map(Vec::len).max().unwrap_or(0);

    // Every shared substring sits inside some maximal run, and every slice
    // of a maximal run is shared, so walking lengths downwards is exhaustive
    let mut ranked = Vec::new();
    for length in (min_length..=longest).rev() {
        if ranked.len() >= limit {
            break;
        }
        let same_length: BTreeSet<String> = runs
            .iter()
            .filter(|run| run.len() >= length)
            .flat_map(|run| run.windows(length).map(|w| w.iter().collect::<String>()))
            .collect();
        ranked.extend(same_length.into_iter().take(limit - ranked.len()));
    }
    ranked
}

/// Distinct shared runs over all title pairs that can't be extended on
/// either side, at least `min_length` chars long
fn maximal_runs(titles: &[&str], min_length: usize) -> BTreeSet<Vec<char>> {
    let chars: Vec<Vec<char>> = titles.iter().map(|t| t.chars().collect()).collect();
    let mut runs = BTreeSet::new();

    for (a_idx, a) in chars.iter().enumerate() {
        for b in &chars[a_idx + 1..] {
            for i in 0..a.len() {
                for j in 0..b.len() {
                    // Only start at the left edge of a match so each run is walked once
                    if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
                        continue;
                    }
                    let run = a[i..]
                        .iter()
                        .zip(&b[j..])
                        .take_while(|(x, y)| x == y)
                        .count();
                    if run >= min_length {
                        runs.insert(a[i..i + run].to_vec());
                    }
                }
            }
        }
    }
    runs
}

#[derive(Debug, Clone)]
pub struct CommonSubstringLabeler {
    pub min_length: usize,
    pub terms: usize,
}

impl Default for CommonSubstringLabeler {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_SUBSTRING_LENGTH,
            terms: DEFAULT_SUBSTRING_TERMS,
        }
    }
}

impl Labeler for CommonSubstringLabeler {
    fn label(&self, titles: &[&str]) -> String {
        top_common_substrings(titles, self.min_length, self.terms)
            .join(" ")
            .trim()
            .to_string()
    }

    fn name(&self) -> &'static str {
        "common_substring"
    }
}

// ============================================================================
// Keywords
// ============================================================================

/// A noun phrase and the word it hangs off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounChunk {
    pub text: String,
    pub head: String,
}

/// Linguistic annotation capability used by [`KeywordLabeler`]
pub trait Annotator {
    fn noun_chunks(&self, sentence: &str) -> Vec<NounChunk>;

    /// Dictionary form of a single word
    fn lemma(&self, word: &str) -> String;
}

/// Model-free annotator: a chunk is a maximal run of non-stopwords
#[derive(Debug, Clone, Copy, Default)]
pub struct StopwordChunker;

impl Annotator for StopwordChunker {
    fn noun_chunks(&self, sentence: &str) -> Vec<NounChunk> {
        let cleaned = clean_text(sentence);
        let mut chunks = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        for token in cleaned.split(' ').chain(std::iter::once("")) {
            if !token.is_empty() && !is_stopword(token) {
                run.push(token);
                continue;
            }
            if let Some(last) = run.last() {
                chunks.push(NounChunk {
                    text: run.join(" "),
                    head: last.to_string(),
                });
                run.clear();
            }
        }
        chunks
    }

    fn lemma(&self, word: &str) -> String {
        word.to_string()
    }
}

/// Lowercase and keep only ASCII letters, digits and spaces
fn clean_term(term: &str) -> String {
    term.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

fn sentence_terms(sentence: &str, annotator: &dyn Annotator) -> Vec<String> {
    let mut raw: BTreeSet<String> = BTreeSet::new();
    for chunk in annotator.noun_chunks(sentence) {
        raw.insert(chunk.text);
        raw.insert(chunk.head);
    }

    raw.into_iter()
        .filter(|term| !is_stopword(term))
        .map(|term| {
            if term.contains(' ') {
                term
            } else {
                annotator.lemma(&term)
            }
        })
        .map(|term| clean_term(&term))
        .filter(|term| !term.is_empty())
        .collect()
}

/// True if `short`'s words appear contiguously inside `long`
fn contained_in(short: &str, long: &str) -> bool {
    let short: Vec<&str> = short.split(' ').collect();
    let long: Vec<&str> = long.split(' ').collect();
    short.len() < long.len() && long.windows(short.len()).any(|w| w == short.as_slice())
}

fn word_count(term: &str) -> usize {
    term.split(' ').count()
}

/// Fold every term into the shortest longer term that contains it
fn fold_contained_terms(counts: HashMap<String, usize>) -> HashMap<String, usize> {
    let mut terms: Vec<String> = counts.keys().cloned().collect();
    terms.sort_by(|a, b| word_count(a).cmp(&word_count(b)).then_with(|| a.cmp(b)));

    let mut folded = counts;
    for (idx, short) in terms.iter().enumerate() {
        let target = terms[idx + 1..]
            .iter()
            .filter(|long| contained_in(short, long))
            .min_by(|a, b| word_count(a).cmp(&word_count(b)).then_with(|| a.cmp(b)));

        if let Some(long) = target
            && let Some(freq) = folded.remove(short)
        {
            *folded.entry(long.clone()).or_insert(0) += freq;
        }
    }
    folded
}

/// Most relevant terms across `titles` with their folded frequencies
///
/// Ranked by frequency, then word count (both descending), then term.
pub fn top_keywords(
    titles: &[&str],
    annotator: &dyn Annotator,
    top_n: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        for term in sentence_terms(title, annotator) {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = fold_contained_terms(counts).into_iter().collect();
    ranked.sort_by(|(ta, fa), (tb, fb)| {
        fb.cmp(fa)
            .then_with(|| word_count(tb).cmp(&word_count(ta)))
            .then_with(|| ta.cmp(tb))
    });
    ranked.truncate(top_n);
    ranked
}

/// Debug rendering with each term wrapped in brackets
pub fn render_keywords(keywords: &[(String, usize)]) -> String {
    keywords
        .iter()
        .map(|(term, freq)| format!("[{}] ({})", term, freq))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct KeywordLabeler<A> {
    annotator: A,
    pub terms: usize,
}

impl<A: Annotator> KeywordLabeler<A> {
    pub fn new(annotator: A) -> Self {
        Self {
            annotator,
            terms: DEFAULT_KEYWORD_TERMS,
        }
    }

    pub fn with_terms(mut self, terms: usize) -> Self {
        self.terms = terms;
        self
    }
}

impl<A: Annotator> Labeler for KeywordLabeler<A> {
    fn label(&self, titles: &[&str]) -> String {
        top_keywords(titles, &self.annotator, self.terms)
            .into_iter()
            .map(|(term, _)| term)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn name(&self) -> &'static str {
        "keywords"
    }
}

// ============================================================================
// Word frequencies
// ============================================================================

/// The `n` most frequent normalized tokens, ties in lexical order
pub fn top_words<S: AsRef<str>>(titles: &[S], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        for token in normalize(title.as_ref(), None) {
            if !token.is_empty() {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
    }

    let mut words: Vec<(String, usize)> = counts.into_iter().collect();
    words.sort_by(|(wa, ca), (wb, cb)| cb.cmp(ca).then_with(|| wa.cmp(wb)));
    words.truncate(n);
    words
}
