//! Stateful search engine: tokenizer lifecycle, atomic index replacement,
//! coalesced asynchronous builds and lifecycle events.
//!
//! # Events
//!
//! [`SearchEngine::subscribe`] hands out a broadcast receiver of
//! [`EngineEvent`]s. Events are best-effort notifications: a lagging or
//! absent subscriber never affects an operation, and every failure is also
//! returned to the caller.
//!
//! # Concurrency
//!
//! At most one asynchronous build is in flight per engine. While it runs,
//! further [`SearchEngine::build_index_async`] calls return a clone of the
//! same [`BuildHandle`]; the build makes progress whenever any clone is
//! polled. The previous index stays queryable until the new one replaces it.

use crate::build::{build_index, build_index_async, BuildOptions};
use crate::config::EngineConfig;
use crate::error::{Result, SearchError};
use crate::id::random_id;
use crate::index::{Document, DocumentInput, QueryResult, SearchIndex};
use crate::query::{query as rank, QueryOptions};
use crate::scheduler::{Immediate, Scheduler};
use crate::tokenizer::Tokenizer;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TokenizerReady,
    IndexReady { documents: usize },
    /// Fraction of the current asynchronous build, in `[0, 1]`.
    Progress(f64),
    Error(String),
}

/// Shared handle to an in-flight asynchronous build.
pub type BuildHandle = Shared<BoxFuture<'static, Result<()>>>;

pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

#[derive(Default)]
pub struct AsyncBuildOptions {
    /// Overrides [`EngineConfig::chunk_size`].
    pub chunk_size: Option<usize>,
    pub on_progress: Option<ProgressCallback>,
}

/// Documents and the index built from them, replaced together.
#[derive(Debug)]
pub struct Corpus<T> {
    documents: Vec<Document<T>>,
    index: SearchIndex,
}

impl<T> Corpus<T> {
    pub fn documents(&self) -> &[Document<T>] { &self.documents }
    pub fn index(&self) -> &SearchIndex { &self.index }
}

struct Inner<T> {
    config: EngineConfig,
    scheduler: Arc<dyn Scheduler>,
    tokenizer: RwLock<Option<Arc<dyn Tokenizer>>>,
    corpus: RwLock<Option<Arc<Corpus<T>>>>,
    pending: Mutex<Option<BuildHandle>>,
    events: broadcast::Sender<EngineEvent>,
}

impl<T> Inner<T> {
    fn emit(&self, event: EngineEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn fail(&self, err: SearchError) -> SearchError {
        tracing::warn!(error = %err, "engine operation failed");
        self.emit(EngineEvent::Error(err.to_string()));
        err
    }

    fn tokenizer(&self) -> Result<Arc<dyn Tokenizer>> {
        let tokenizer = self.tokenizer.read().clone();
        tokenizer.ok_or_else(|| self.fail(SearchError::TokenizerNotReady))
    }

    fn ingest(&self, inputs: Vec<DocumentInput<T>>) -> Vec<Document<T>> {
        inputs.into_iter().map(|input| input.into_document(|| random_id(&self.config.id_prefix))).collect()
    }

    fn install(&self, documents: Vec<Document<T>>, index: SearchIndex) {
        let count = documents.len();
        tracing::info!(num_docs = count, num_terms = index.term_count(), avg_doc_length = index.avg_doc_length, "index ready");
        *self.corpus.write() = Some(Arc::new(Corpus { documents, index }));
        self.emit(EngineEvent::IndexReady { documents: count });
    }
}

pub struct SearchEngine<T = serde_json::Value> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SearchEngine<T> {
    fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<T> Default for SearchEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

impl<T> SearchEngine<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(config: EngineConfig) -> Self { Self::with_scheduler(config, Arc::new(Immediate)) }

    pub fn with_scheduler(config: EngineConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let inner = Inner {
            config,
            scheduler,
            tokenizer: RwLock::new(None),
            corpus: RwLock::new(None),
            pending: Mutex::new(None),
            events,
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn config(&self) -> &EngineConfig { &self.inner.config }
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> { self.inner.events.subscribe() }
    pub fn is_tokenizer_ready(&self) -> bool { self.inner.tokenizer.read().is_some() }
    pub fn is_index_ready(&self) -> bool { self.inner.corpus.read().is_some() }
    pub fn is_building(&self) -> bool { self.inner.pending.lock().is_some() }
    pub fn corpus(&self) -> Option<Arc<Corpus<T>>> { self.inner.corpus.read().clone() }

    /// Install the tokenizer produced by `load`. Once a tokenizer is ready,
    /// later calls return immediately without awaiting `load`.
    pub async fn initialize_tokenizer<F>(&self, load: F) -> Result<()>
    where
        F: Future<Output = Result<Arc<dyn Tokenizer>>>,
    {
        if self.is_tokenizer_ready() {
            return Ok(());
        }
        match load.await {
            Ok(tokenizer) => {
                *self.inner.tokenizer.write() = Some(tokenizer);
                tracing::info!("tokenizer ready");
                self.inner.emit(EngineEvent::TokenizerReady);
                Ok(())
            }
            Err(err) => Err(self.inner.fail(err)),
        }
    }

    /// Build and install an index synchronously. A failed build leaves the
    /// previous index in place.
    pub fn build_index(&self, inputs: Vec<DocumentInput<T>>) -> Result<()> {
        if inputs.is_empty() {
            return Err(self.inner.fail(SearchError::EmptyCorpus));
        }
        let tokenizer = self.inner.tokenizer()?;
        let documents = self.inner.ingest(inputs);
        match build_index(&documents, tokenizer.as_ref(), self.inner.config.bm25) {
            Ok(index) => {
                self.inner.install(documents, index);
                Ok(())
            }
            Err(err) => Err(self.inner.fail(err)),
        }
    }

    /// Start a chunked build, or join the one already in flight.
    ///
    /// Input validation happens before this returns; failures during the
    /// build are delivered through the handle.
    pub fn build_index_async(&self, inputs: Vec<DocumentInput<T>>, options: AsyncBuildOptions) -> Result<BuildHandle> {
        if inputs.is_empty() {
            return Err(self.inner.fail(SearchError::EmptyCorpus));
        }
        let mut pending = self.inner.pending.lock();
        if let Some(handle) = pending.as_ref() {
            tracing::debug!(submitted = inputs.len(), "build already in flight, joining it");
            return Ok(handle.clone());
        }

        let tokenizer = self.inner.tokenizer()?;
        let defaults = self.inner.config.build_options();
        let build_opts = BuildOptions { chunk_size: options.chunk_size.unwrap_or(defaults.chunk_size), ..defaults };
        if build_opts.chunk_size == 0 {
            return Err(self.inner.fail(SearchError::InvalidChunkSize));
        }

        let documents = self.inner.ingest(inputs);
        let inner = Arc::clone(&self.inner);
        let mut on_progress = options.on_progress;
        let handle = async move {
            let events = inner.events.clone();
            let built = build_index_async(&documents, tokenizer.as_ref(), inner.scheduler.as_ref(), &build_opts, |p| {
                if let Some(cb) = on_progress.as_mut() {
                    cb(p);
                }
                let _ = events.send(EngineEvent::Progress(p));
            })
            .await;
            let outcome = match built {
                Ok(index) => {
                    inner.install(documents, index);
                    Ok(())
                }
                Err(err) => Err(inner.fail(err)),
            };
            *inner.pending.lock() = None;
            outcome
        }
        .boxed()
        .shared();

        *pending = Some(handle.clone());
        Ok(handle)
    }

    /// Rank the current corpus against `input`. Before the first successful
    /// build this returns [`QueryResult::not_ready`].
    pub fn query(&self, input: &str, options: &QueryOptions) -> Result<QueryResult<T>> {
        options.validate()?;
        let Some(corpus) = self.corpus() else {
            return Ok(QueryResult::not_ready());
        };
        let tokenizer = self.inner.tokenizer()?;
        rank(&corpus.documents, &corpus.index, tokenizer.as_ref(), input, options).map_err(|err| self.inner.fail(err))
    }

    /// Like [`query`](Self::query), but waits for an in-flight build first.
    pub async fn query_async(&self, input: &str, options: &QueryOptions) -> Result<QueryResult<T>> {
        options.validate()?;
        let pending = self.inner.pending.lock().clone();
        if let Some(handle) = pending {
            if let Err(err) = handle.await {
                tracing::debug!(error = %err, "in-flight build failed, querying previous index");
            }
        }
        self.query(input, options)
    }
}
