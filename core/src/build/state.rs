use crate::error::Result;
use crate::index::{DocId, Document, DocumentFrequency, SearchIndex, SparseVector, Term};
use crate::scoring::{bm25_vector, Bm25Params, CorpusStats};
use crate::tokenizer::Tokenizer;
use std::collections::{HashMap, HashSet};

/// Token sequence retained per document until finalize time.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedDocument {
    pub id: DocId,
    pub tokens: Vec<Term>,
}

/// Accumulator threaded through one build. Owned exclusively by the build
/// that created it and consumed by [`BuildState::finalize`].
#[derive(Debug, Default)]
pub struct BuildState {
    document_frequency: DocumentFrequency,
    tokenized: Vec<TokenizedDocument>,
    total_tokens: usize,
}

impl BuildState {
    pub fn new() -> Self { Self::default() }

    pub fn document_frequency(&self) -> &DocumentFrequency { &self.document_frequency }
    pub fn tokenized(&self) -> &[TokenizedDocument] { &self.tokenized }
    pub fn total_tokens(&self) -> usize { self.total_tokens }
    pub fn document_count(&self) -> usize { self.tokenized.len() }

    /// Tokenize one document and fold its statistics into the accumulator.
    /// Each distinct term bumps its document frequency once, however often
    /// it repeats within the document.
    pub fn process_document<T>(&mut self, tokenizer: &dyn Tokenizer, doc: &Document<T>) -> Result<()> {
        let tokens = if doc.text.is_empty() { Vec::new() } else { tokenizer.tokenize(&doc.text)? };
        self.total_tokens += tokens.len();

        let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        for term in unique {
            match self.document_frequency.get_mut(term) {
                Some(df) => *df += 1,
                None => { self.document_frequency.insert(term.to_string(), 1); }
            }
        }

        self.tokenized.push(TokenizedDocument { id: doc.id.clone(), tokens });
        Ok(())
    }

    /// Weight every retained document against the fully accumulated corpus
    /// statistics and freeze the result.
    pub fn finalize(self, total_docs: usize, params: Bm25Params) -> SearchIndex {
        let avg_doc_length = if total_docs > 0 { self.total_tokens as f64 / total_docs as f64 } else { 0.0 };

        let stats = CorpusStats {
            total_docs,
            document_frequency: &self.document_frequency,
            avg_doc_length,
            params,
        };
        let document_vectors: HashMap<DocId, SparseVector> = self
            .tokenized
            .iter()
            .map(|t| (t.id.clone(), bm25_vector(&t.tokens, &stats)))
            .collect();

        SearchIndex { document_frequency: self.document_frequency, document_vectors, avg_doc_length, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;

    fn doc(id: &str, text: &str) -> Document {
        Document::new(id, text, "")
    }

    #[test]
    fn new_states_are_independent() {
        let mut a = BuildState::new();
        let b = BuildState::new();
        a.process_document(&WhitespaceTokenizer, &doc("1", "x")).unwrap();
        assert_eq!(a.document_count(), 1);
        assert_eq!(b.document_count(), 0);
        assert!(b.document_frequency().is_empty());
    }

    #[test]
    fn repeats_within_a_document_count_once() {
        let mut state = BuildState::new();
        state.process_document(&WhitespaceTokenizer, &doc("1", "a a a b")).unwrap();
        state.process_document(&WhitespaceTokenizer, &doc("2", "a")).unwrap();
        assert_eq!(state.document_frequency()["a"], 2);
        assert_eq!(state.document_frequency()["b"], 1);
        assert_eq!(state.total_tokens(), 5);
        assert_eq!(state.tokenized()[0].tokens, vec!["a", "a", "a", "b"]);
    }

    #[test]
    fn empty_text_yields_empty_tokens() {
        let mut state = BuildState::new();
        state.process_document(&WhitespaceTokenizer, &doc("1", "")).unwrap();
        assert_eq!(state.total_tokens(), 0);
        assert!(state.tokenized()[0].tokens.is_empty());
    }

    #[test]
    fn accumulation_is_order_independent() {
        let docs = [doc("1", "a b"), doc("2", "b c c"), doc("3", "d")];
        let mut forward = BuildState::new();
        for d in &docs {
            forward.process_document(&WhitespaceTokenizer, d).unwrap();
        }
        let mut backward = BuildState::new();
        for d in docs.iter().rev() {
            backward.process_document(&WhitespaceTokenizer, d).unwrap();
        }
        assert_eq!(forward.document_frequency(), backward.document_frequency());
        assert_eq!(forward.total_tokens(), backward.total_tokens());

        let params = Bm25Params::default();
        assert_eq!(forward.finalize(3, params), backward.finalize(3, params));
    }

    #[test]
    fn finalize_empty_state() {
        let index = BuildState::new().finalize(0, Bm25Params::default());
        assert_eq!(index.avg_doc_length, 0.0);
        assert!(index.document_vectors.is_empty());
        assert!(index.document_frequency.is_empty());
    }

    #[test]
    fn finalize_computes_average_length() {
        let mut state = BuildState::new();
        state.process_document(&WhitespaceTokenizer, &doc("1", "a b")).unwrap();
        state.process_document(&WhitespaceTokenizer, &doc("2", "b c d e")).unwrap();
        let index = state.finalize(2, Bm25Params::default());
        assert_eq!(index.avg_doc_length, 3.0);
        assert_eq!(index.document_count(), 2);
        let keys: Vec<&str> = index.vector("2").unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "c", "d", "e"]);
    }
}
