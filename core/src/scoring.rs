//! BM25 term weighting and cosine similarity over sparse term vectors.
//!
//! The same [`bm25_vector`] routine weights indexed documents and queries, so
//! both sides of a comparison are always computed against identical corpus
//! statistics.

use crate::index::{DocumentFrequency, SparseVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_K1: f64 = 1.2;
pub const DEFAULT_B: f64 = 0.75;

/// BM25 parameters: `k1` controls tf saturation, `b` length normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default = "default_b")]
    pub b: f64,
}
fn default_k1() -> f64 { DEFAULT_K1 }
fn default_b() -> f64 { DEFAULT_B }

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: DEFAULT_K1, b: DEFAULT_B } }
}

/// Corpus-wide statistics a token sequence is weighted against.
#[derive(Debug, Clone, Copy)]
pub struct CorpusStats<'a> {
    pub total_docs: usize,
    pub document_frequency: &'a DocumentFrequency,
    pub avg_doc_length: f64,
    pub params: Bm25Params,
}

/// Smoothed BM25 idf: `ln((N - df + 0.5) / (df + 0.5) + 1)`, floored at 0.
///
/// `df` can exceed `N` when an index is scored against fewer documents than
/// it was built from; such terms get no weight rather than a negative one.
pub fn idf(total_docs: usize, df: u32) -> f64 {
    let n = total_docs as f64;
    let df = df as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln().max(0.0)
}

/// Weight a token sequence into a sparse BM25 vector.
///
/// A corpus with no tokens at all (`avg_doc_length == 0`) has nothing to
/// score, so every vector weighted against it is empty.
pub fn bm25_vector<S: AsRef<str>>(tokens: &[S], stats: &CorpusStats<'_>) -> SparseVector {
    let mut vector = SparseVector::new();
    if tokens.is_empty() || stats.avg_doc_length <= 0.0 {
        return vector;
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_ref()).or_insert(0) += 1;
    }

    let Bm25Params { k1, b } = stats.params;
    let doc_length = tokens.len().max(1) as f64;
    let length_norm = 1.0 - b + b * (doc_length / stats.avg_doc_length);

    for (term, tf) in counts {
        let df = stats.document_frequency.get(term).copied().unwrap_or(0);
        let tf = tf as f64;
        let weight = idf(stats.total_docs, df) * (tf * (k1 + 1.0)) / (tf + k1 * length_norm);
        if weight != 0.0 {
            vector.insert(term.to_string(), weight);
        }
    }
    vector
}

/// Cosine of the angle between two sparse vectors; `0` when either is empty
/// or all-zero.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    for (term, w) in a {
        dot += w * b.get(term).copied().unwrap_or(0.0);
        norm_a += w * w;
    }
    let norm_b: f64 = b.values().map(|w| w * w).sum();

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    dot / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    fn stats(df: &DocumentFrequency, total_docs: usize, avg_doc_length: f64) -> CorpusStats<'_> {
        CorpusStats { total_docs, document_frequency: df, avg_doc_length, params: Bm25Params::default() }
    }

    #[test]
    fn idf_is_positive_for_rare_and_common_terms() {
        assert!(idf(10, 0) > idf(10, 5));
        assert!(idf(10, 10) > 0.0);
    }

    #[test]
    fn idf_never_goes_negative() {
        assert_eq!(idf(1, 3), 0.0);
        let df: DocumentFrequency = [("x".to_string(), 3), ("y".to_string(), 0)].into_iter().collect();
        let v = bm25_vector(&["x", "y"], &stats(&df, 1, 2.0));
        assert!(!v.contains_key("x"));
        assert!(v.values().all(|w| *w > 0.0));
    }

    #[test]
    fn bm25_matches_hand_computed_weight() {
        let df: DocumentFrequency = [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        let v = bm25_vector(&["a", "b"], &stats(&df, 2, 2.0));

        let idf_a = (1.5f64 / 1.5 + 1.0).ln();
        let expected_a = idf_a * (1.0 * 2.2) / (1.0 + 1.2);
        assert!((v["a"] - expected_a).abs() < 1e-12);
        assert!(v["a"] > v["b"], "rarer term weighs more");
    }

    #[test]
    fn repeated_terms_saturate() {
        let df: DocumentFrequency = [("a".to_string(), 1)].into_iter().collect();
        let once = bm25_vector(&["a", "x", "x", "x"], &stats(&df, 3, 4.0));
        let thrice = bm25_vector(&["a", "a", "a", "x"], &stats(&df, 3, 4.0));
        assert!(thrice["a"] > once["a"]);
        assert!(thrice["a"] < 3.0 * once["a"]);
    }

    #[test]
    fn empty_tokens_give_empty_vector() {
        let df = DocumentFrequency::new();
        let empty: [&str; 0] = [];
        assert!(bm25_vector(&empty, &stats(&df, 3, 2.0)).is_empty());
    }

    #[test]
    fn zero_avg_length_gives_empty_vector() {
        let df = DocumentFrequency::new();
        let v = bm25_vector(&["q"], &stats(&df, 2, 0.0));
        assert!(v.is_empty());
    }

    #[test]
    fn unseen_query_terms_still_weighted() {
        let df = DocumentFrequency::new();
        let v = bm25_vector(&["unseen"], &stats(&df, 4, 2.0));
        assert!(v["unseen"] > 0.0);
    }

    #[test]
    fn cosine_identical_is_one() {
        let a = vec_of(&[("x", 0.5), ("y", 2.0)]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_disjoint_is_zero() {
        let a = vec_of(&[("x", 1.0)]);
        let b = vec_of(&[("y", 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_empty_is_zero_not_nan() {
        let a = vec_of(&[("x", 1.0)]);
        let empty = SparseVector::new();
        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &a), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn cosine_partial_overlap_in_unit_range() {
        let a = vec_of(&[("x", 1.0), ("y", 3.0)]);
        let b = vec_of(&[("y", 0.2), ("z", 4.0)]);
        let s = cosine_similarity(&a, &b);
        assert!(s > 0.0 && s < 1.0);
    }
}
