//! Title Grouping Engine
//!
//! Takes a flat collection of headlines and produces a two-level grouping:
//! similar titles become first-level groups, related groups become topics,
//! and each level gets a human-readable label.
//!
//! ## Stages
//! - [`normalize`]: clean and tokenize titles
//! - [`similarity`]: lexical (TF-IDF) or semantic (embedding) pairwise scores
//! - [`former`]: greedy candidate groups above a threshold
//! - [`reconcile`]: close overlapping groups into a partition
//! - [`aggregate`]: cluster groups into topics
//! - [`label`]: common-substring or keyword labels
//! - [`pipeline`]: all of the above, assembled into a [`Visualization`]
//!
//! Everything here is synchronous and does no I/O. Similarity engines and
//! annotators are injected by the caller.
//!
//! [`Visualization`]: headline_core::Visualization

pub mod aggregate;
pub mod error;
pub mod former;
pub mod label;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod similarity;
pub mod stopwords;

pub use aggregate::{TopicCluster, aggregate};
pub use error::{GroupingError, Result};
pub use former::{CandidateGroup, Partition, form_groups, group_similar_titles};
pub use label::{
    Annotator, CommonSubstringLabeler, KeywordLabeler, LabelStrategy, Labeler, NounChunk,
    StopwordChunker, extract_common_substrings, render_keywords, top_common_substrings,
    top_keywords, top_words,
};
pub use normalize::{TermMapping, clean_text, normalize};
pub use pipeline::{GroupingConfig, TitleData, VisualizationBuild, build_visualization};
pub use reconcile::{is_partition, merge_overlapping, reconcile, remove_strict_subsets};
pub use similarity::{
    EmbeddingVector, LexicalSimilarity, ScoredPair, SemanticSimilarity, SentenceEncoder,
    SimilarityEngine, SimilarityMatrix, cosine_similarity,
};
