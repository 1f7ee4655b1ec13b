use super::state::BuildState;
use crate::error::{Result, SearchError};
use crate::index::{Document, SearchIndex};
use crate::scheduler::Scheduler;
use crate::scoring::Bm25Params;
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub chunk_size: usize,
    pub params: Bm25Params,
}

impl Default for BuildOptions {
    fn default() -> Self { Self { chunk_size: DEFAULT_CHUNK_SIZE, params: Bm25Params::default() } }
}

/// Build an index in slices of `chunk_size` documents, yielding to
/// `scheduler` between slices.
///
/// After each slice `on_progress` receives the fraction of documents that
/// had been processed when that slice started; the last call is always
/// exactly `1.0`, after finalization. The resulting index is identical to
/// [`build_index`](super::build_index) on the same input.
pub async fn build_index_async<T, P>(
    documents: &[Document<T>],
    tokenizer: &dyn Tokenizer,
    scheduler: &dyn Scheduler,
    options: &BuildOptions,
    mut on_progress: P,
) -> Result<SearchIndex>
where
    T: Sync,
    P: FnMut(f64) + Send,
{
    if options.chunk_size == 0 {
        return Err(SearchError::InvalidChunkSize);
    }
    let mut state = BuildState::new();

    if documents.is_empty() {
        on_progress(1.0);
        return Ok(state.finalize(0, options.params));
    }

    let total = documents.len();
    for (n, chunk) in documents.chunks(options.chunk_size).enumerate() {
        let started = n * options.chunk_size;
        for doc in chunk {
            state.process_document(tokenizer, doc)?;
        }
        tracing::debug!(started, len = chunk.len(), total, "processed chunk");
        on_progress(started as f64 / total as f64);
        scheduler.yield_now().await;
    }

    let index = state.finalize(total, options.params);
    on_progress(1.0);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Immediate;
    use crate::tokenizer::WhitespaceTokenizer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingScheduler(AtomicUsize);

    #[async_trait]
    impl Scheduler for CountingScheduler {
        async fn yield_now(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn docs(n: usize) -> Vec<Document<()>> {
        (0..n).map(|i| Document::new(i.to_string(), format!("t{} shared", i % 3), "")).collect()
    }

    #[tokio::test]
    async fn progress_reported_at_chunk_start() {
        let docs = docs(3);
        let mut seen = Vec::new();
        let opts = BuildOptions { chunk_size: 2, ..Default::default() };
        build_index_async(&docs, &WhitespaceTokenizer, &Immediate, &opts, |p| seen.push(p)).await.unwrap();
        assert_eq!(seen, vec![0.0, 2.0 / 3.0, 1.0]);
    }

    #[tokio::test]
    async fn empty_input_reports_only_completion() {
        let docs: Vec<Document<()>> = Vec::new();
        let scheduler = CountingScheduler::default();
        let mut seen = Vec::new();
        let index = build_index_async(&docs, &WhitespaceTokenizer, &scheduler, &BuildOptions::default(), |p| seen.push(p))
            .await
            .unwrap();
        assert_eq!(seen, vec![1.0]);
        assert_eq!(scheduler.0.load(Ordering::SeqCst), 0);
        assert_eq!(index.avg_doc_length, 0.0);
    }

    #[tokio::test]
    async fn yields_once_per_chunk() {
        let docs = docs(25);
        let scheduler = CountingScheduler::default();
        build_index_async(&docs, &WhitespaceTokenizer, &scheduler, &BuildOptions::default(), |_| {}).await.unwrap();
        assert_eq!(scheduler.0.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_chunk_size_rejected() {
        let docs = docs(2);
        let opts = BuildOptions { chunk_size: 0, ..Default::default() };
        let err = build_index_async(&docs, &WhitespaceTokenizer, &Immediate, &opts, |_| {}).await.unwrap_err();
        assert_eq!(err, SearchError::InvalidChunkSize);
    }

    #[tokio::test]
    async fn matches_synchronous_build() {
        let docs = docs(17);
        let opts = BuildOptions { chunk_size: 4, ..Default::default() };
        let chunked = build_index_async(&docs, &WhitespaceTokenizer, &Immediate, &opts, |_| {}).await.unwrap();
        let direct = super::super::build_index(&docs, &WhitespaceTokenizer, opts.params).unwrap();
        assert_eq!(chunked, direct);
    }
}
