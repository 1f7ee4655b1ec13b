//! Index construction: a strictly sequential fold of documents into a
//! [`BuildState`], followed by BM25 vectorization.

mod chunked;
mod state;

pub use chunked::{build_index_async, BuildOptions, DEFAULT_CHUNK_SIZE};
pub use state::{BuildState, TokenizedDocument};

use crate::error::Result;
use crate::index::{Document, SearchIndex};
use crate::scoring::Bm25Params;
use crate::tokenizer::Tokenizer;

/// Build an index synchronously, with no suspension.
pub fn build_index<T>(documents: &[Document<T>], tokenizer: &dyn Tokenizer, params: Bm25Params) -> Result<SearchIndex> {
    let mut state = BuildState::new();
    for doc in documents {
        state.process_document(tokenizer, doc)?;
    }
    let index = state.finalize(documents.len(), params);
    tracing::debug!(num_docs = index.document_count(), num_terms = index.term_count(), "index built");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;

    #[test]
    fn two_document_corpus() {
        let docs = vec![Document::<()>::new("1", "a b", "x"), Document::new("2", "b c", "y")];
        let index = build_index(&docs, &WhitespaceTokenizer, Bm25Params::default()).unwrap();
        assert_eq!(index.document_frequency.len(), 3);
        assert_eq!(index.document_frequency["a"], 1);
        assert_eq!(index.document_frequency["b"], 2);
        assert_eq!(index.document_frequency["c"], 1);
        assert_eq!(index.avg_doc_length, 2.0);
    }

    #[test]
    fn empty_collection_builds_empty_index() {
        let docs: Vec<Document<()>> = Vec::new();
        let index = build_index(&docs, &WhitespaceTokenizer, Bm25Params::default()).unwrap();
        assert_eq!(index.avg_doc_length, 0.0);
        assert!(index.document_vectors.is_empty());
    }
}
