use crate::error::{Result, SearchError};
use crate::index::{Document, QueryResult, ScoredDocument, SearchIndex};
use crate::scoring::{bm25_vector, cosine_similarity, CorpusStats};
use crate::tokenizer::{expand_query_tokens, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TOP_K_CANDIDATES: usize = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Candidates returned besides the best match.
    pub top_k_candidates: usize,
    /// A best match must score strictly above this value; within `[0, 1]`.
    pub threshold: f64,
    /// Expand queries the tokenizer cannot split (see [`expand_query_tokens`]).
    /// Fragments that occur in no indexed document are dropped.
    pub expand_query: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { top_k_candidates: DEFAULT_TOP_K_CANDIDATES, threshold: DEFAULT_THRESHOLD, expand_query: false }
    }
}

impl QueryOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SearchError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Rank `documents` against `input` by cosine similarity of BM25 vectors.
///
/// Index entries whose id is no longer among `documents` are skipped. Equal
/// scores are ordered by ascending document id.
pub fn query<T: Clone>(
    documents: &[Document<T>],
    index: &SearchIndex,
    tokenizer: &dyn Tokenizer,
    input: &str,
    options: &QueryOptions,
) -> Result<QueryResult<T>> {
    options.validate()?;
    if documents.is_empty() {
        return Ok(QueryResult::not_ready());
    }

    let by_id: HashMap<&str, &Document<T>> = documents.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut tokens = tokenizer.tokenize(input)?;
    if options.expand_query {
        let original = tokens.len();
        tokens = expand_query_tokens(tokenizer, input, tokens)?
            .into_iter()
            .enumerate()
            .filter(|(i, t)| *i < original || index.document_frequency.contains_key(t))
            .map(|(_, t)| t)
            .collect();
    }
    let stats = CorpusStats {
        total_docs: documents.len(),
        document_frequency: &index.document_frequency,
        avg_doc_length: index.avg_doc_length,
        params: index.params,
    };
    let query_vector = bm25_vector(&tokens, &stats);

    let mut scored: Vec<(&Document<T>, f64)> = index
        .document_vectors
        .iter()
        .filter_map(|(id, vector)| by_id.get(id.as_str()).map(|doc| (*doc, cosine_similarity(&query_vector, vector))))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));

    let best_score = scored.first().map(|(_, s)| *s).unwrap_or(0.0);
    let to_scored = |(doc, score): &(&Document<T>, f64)| ScoredDocument { document: (*doc).clone(), score: *score };
    let k = options.top_k_candidates;

    let (best_match, start) = if best_score > options.threshold { (scored.first().map(to_scored), 1) } else { (None, 0) };
    let candidates = scored.iter().skip(start).take(k).map(to_scored).collect();

    tracing::debug!(query_terms = query_vector.len(), scored = scored.len(), best_score, "query ranked");
    Ok(QueryResult { is_index_ready: true, best_match, candidates })
}
