//! Error types for lexq-core.

use thiserror::Error;

/// Errors raised by index construction, querying and the engine surface.
///
/// The type is `Clone` so a failed in-flight build can be handed to every
/// caller awaiting the same [`BuildHandle`](crate::engine::BuildHandle).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Query threshold outside `[0, 1]`.
    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// Chunked build asked to process zero documents per slice.
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    /// Building an index from an empty document collection.
    #[error("no documents to index")]
    EmptyCorpus,

    /// The tokenizer capability was used before initialization.
    #[error("tokenizer is not initialized")]
    TokenizerNotReady,

    /// The tokenizer capability failed to load or to segment text.
    #[error("tokenizer failed: {0}")]
    Tokenizer(String),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for lexq-core operations.
pub type Result<T> = std::result::Result<T, SearchError>;
