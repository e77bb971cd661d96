//! Pairwise similarity between titles
//!
//! Two interchangeable strategies sit behind [`SimilarityEngine`]:
//! - [`LexicalSimilarity`]: TF-IDF over normalized tokens + cosine
//! - [`SemanticSimilarity`]: cosine over vectors from an injected
//!   [`SentenceEncoder`]
//!
//! Both produce scores in [-1, 1] so the rest of the pipeline can threshold
//! them the same way.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

use crate::error::{GroupingError, Result};
use crate::normalize::{TermMapping, normalize};

/// Embedding vector produced by a sentence encoder
pub type EmbeddingVector = Vec<f32>;

/// One unordered pair of title indices (`i < j`) and its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    pub i: usize,
    pub j: usize,
    pub score: f64,
}

/// Square, symmetric matrix of similarity scores indexed by title index
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Array2<f64>,
}

impl SimilarityMatrix {
    /// Build from explicit rows; the rows must form a square matrix
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut scores = Array2::<f64>::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(GroupingError::DimensionMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            for (j, score) in row.into_iter().enumerate() {
                scores[[i, j]] = score;
            }
        }
        Ok(Self { scores })
    }

    /// Gram matrix of L2-normalized row vectors, clamped to [-1, 1]
    fn from_unit_rows(vectors: &Array2<f64>) -> Self {
        let mut scores = vectors.dot(&vectors.t());
        scores.mapv_inplace(|s| s.clamp(-1.0, 1.0));
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[[i, j]]
    }

    /// All `(i, j, score)` with `i < j`, row-major
    pub fn pairwise_scores(&self) -> Vec<ScoredPair> {
        let n = self.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(ScoredPair {
                    i,
                    j,
                    score: self.scores[[i, j]],
                });
            }
        }
        pairs
    }
}

/// Strategy that scores every pair of texts in one call
pub trait SimilarityEngine {
    fn similarity_matrix(&self, texts: &[String]) -> Result<SimilarityMatrix>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// External sentence-embedding capability
///
/// Implementations must fail with [`GroupingError::EncoderUnavailable`]
/// rather than return placeholder vectors.
pub trait SentenceEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;
}

/// Calculate cosine similarity between two embeddings
///
/// Formula: cos(θ) = (A · B) / (||A|| ||B||). Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(GroupingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let a_view = ArrayView1::from(a);
    let b_view = ArrayView1::from(b);

    let dot_product = a_view.dot(&b_view);
    let norm_a = a_view.dot(&a_view).sqrt();
    let norm_b = b_view.dot(&b_view).sqrt();

    // Avoid division by zero
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot_product / (norm_a * norm_b)) as f64)
}

/// Scale every row to unit length; all-zero rows stay zero
fn normalize_rows(matrix: &mut Array2<f64>) {
    for mut row in matrix.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
}

/// TF-IDF + cosine similarity over normalized tokens
#[derive(Debug, Clone, Default)]
pub struct LexicalSimilarity {
    term_mapping: Option<TermMapping>,
}

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply whole-word substitutions before tokenizing
    pub fn with_term_mapping(mut self, term_mapping: TermMapping) -> Self {
        self.term_mapping = Some(term_mapping);
        self
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        normalize(text, self.term_mapping.as_ref())
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Document-term matrix with smooth idf weights and unit rows
    ///
    /// Vocabulary columns follow lexical term order so the matrix is
    /// identical across runs.
    pub fn tfidf_matrix(&self, texts: &[String]) -> Array2<f64> {
        let documents: Vec<Vec<String>> = texts.iter().map(|t| self.tokenize(t)).collect();

        let vocabulary: BTreeMap<&str, usize> = documents
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        let mut doc_freq = vec![0usize; vocabulary.len()];
        let mut matrix = Array2::<f64>::zeros((documents.len(), vocabulary.len()));
        for (row, tokens) in documents.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for token in tokens {
                let col = vocabulary[token.as_str()];
                matrix[[row, col]] += 1.0;
                if seen.insert(col) {
                    doc_freq[col] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        for (col, df) in doc_freq.iter().enumerate() {
            let idf = ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0;
            matrix.column_mut(col).mapv_inplace(|tf| tf * idf);
        }

        normalize_rows(&mut matrix);
        debug!(
            "TF-IDF matrix: {} documents x {} terms",
            documents.len(),
            vocabulary.len()
        );
        matrix
    }
}

impl SimilarityEngine for LexicalSimilarity {
    fn similarity_matrix(&self, texts: &[String]) -> Result<SimilarityMatrix> {
        Ok(SimilarityMatrix::from_unit_rows(&self.tfidf_matrix(texts)))
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

/// Cosine similarity over sentence embeddings
pub struct SemanticSimilarity<E> {
    encoder: E,
}

impl<E: SentenceEncoder> SemanticSimilarity<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }
}

impl<E: SentenceEncoder> SimilarityEngine for SemanticSimilarity<E> {
    fn similarity_matrix(&self, texts: &[String]) -> Result<SimilarityMatrix> {
        if texts.is_empty() {
            return SimilarityMatrix::from_rows(Vec::new());
        }

        let embeddings = self.encoder.encode(texts)?;
        if embeddings.len() != texts.len() {
            return Err(GroupingError::EmbeddingCount {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }

        let n = embeddings.len();
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let score = cosine_similarity(&embeddings[i], &embeddings[j])?.clamp(-1.0, 1.0);
                rows[i][j] = score;
                rows[j][i] = score;
            }
        }

        debug!("Embedded {} texts (dimension={})", n, embeddings[0].len());
        SimilarityMatrix::from_rows(rows)
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}
