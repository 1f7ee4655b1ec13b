//! In-process BM25 text search.
//!
//! Documents are tokenized into a [`build::BuildState`], vectorized with BM25
//! into an immutable [`SearchIndex`], and queried by cosine similarity.
//! [`engine::SearchEngine`] wraps the pipeline with tokenizer lifecycle,
//! chunked non-blocking builds and lifecycle events.

pub mod build;
pub mod config;
pub mod engine;
pub mod error;
pub mod id;
mod index;
pub mod query;
pub mod scheduler;
pub mod scoring;
pub mod tokenizer;

pub use config::EngineConfig;
pub use engine::{AsyncBuildOptions, BuildHandle, Corpus, EngineEvent, SearchEngine};
pub use error::{Result, SearchError};
pub use index::*;
pub use query::QueryOptions;
pub use scoring::Bm25Params;
pub use tokenizer::{JiebaTokenizer, TextTokenizer, Tokenizer, WhitespaceTokenizer};
