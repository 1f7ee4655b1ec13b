use crate::scoring::Bm25Params;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type DocId = String;
pub type Term = String;

/// term -> number of distinct documents containing it.
pub type DocumentFrequency = HashMap<Term, u32>;

/// term -> non-negative weight. Only non-zero terms are stored; ordered so
/// that dot products accumulate in a reproducible order.
pub type SparseVector = BTreeMap<Term, f64>;

/// A searchable document. `text` is tokenized and scored, `content` is an
/// opaque payload handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T = serde_json::Value> {
    pub id: DocId,
    pub text: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<T>,
}

impl<T> Document<T> {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), content: content.into(), metadata: None }
    }

    pub fn with_metadata(mut self, metadata: T) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A document as submitted for ingestion; the id is generated when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput<T = serde_json::Value> {
    #[serde(default)]
    pub id: Option<DocId>,
    pub text: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Option<T>,
}

impl<T> DocumentInput<T> {
    pub fn new(text: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: None, text: text.into(), content: content.into(), metadata: None }
    }

    pub fn with_id(mut self, id: impl Into<DocId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Assign the final id, calling `generate` only when none was supplied.
    pub fn into_document(self, generate: impl FnOnce() -> DocId) -> Document<T> {
        Document {
            id: self.id.unwrap_or_else(generate),
            text: self.text,
            content: self.content,
            metadata: self.metadata,
        }
    }
}

impl<T> From<Document<T>> for DocumentInput<T> {
    fn from(doc: Document<T>) -> Self {
        Self { id: Some(doc.id), text: doc.text, content: doc.content, metadata: doc.metadata }
    }
}

/// Immutable result of a build. Valid only against the documents it was
/// built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchIndex {
    pub document_frequency: DocumentFrequency,
    pub document_vectors: HashMap<DocId, SparseVector>,
    pub avg_doc_length: f64,
    pub params: Bm25Params,
}

impl SearchIndex {
    pub fn document_count(&self) -> usize { self.document_vectors.len() }
    pub fn term_count(&self) -> usize { self.document_frequency.len() }
    pub fn vector(&self, id: &str) -> Option<&SparseVector> { self.document_vectors.get(id) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument<T = serde_json::Value> {
    #[serde(flatten)]
    pub document: Document<T>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T = serde_json::Value> {
    pub is_index_ready: bool,
    pub best_match: Option<ScoredDocument<T>>,
    pub candidates: Vec<ScoredDocument<T>>,
}

impl<T> QueryResult<T> {
    /// Result for a query issued before any index exists.
    pub fn not_ready() -> Self {
        Self { is_index_ready: false, best_match: None, candidates: Vec::new() }
    }
}
