use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lexq_core::engine::{AsyncBuildOptions, EngineEvent, SearchEngine};
use lexq_core::scheduler::TokioYield;
use lexq_core::{EngineConfig, JiebaTokenizer, QueryOptions, QueryResult, TextTokenizer, Tokenizer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{fmt, EnvFilter};

mod input;

#[derive(Parser)]
#[command(name = "lexq")]
#[command(about = "Build an in-memory BM25 index from JSON documents and rank queries against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CorpusArgs {
    /// Input path (JSON / JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Engine configuration JSON; defaults come from LEXQ_* environment variables
    #[arg(long)]
    config: Option<String>,
    /// Documents processed per build slice
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Word segmentation used for documents and queries
    #[arg(long, value_enum, default_value_t = TokenizerKind::English)]
    tokenizer: TokenizerKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TokenizerKind {
    /// Stemmed English words, stopwords removed
    English,
    /// Normalized words kept verbatim
    Plain,
    /// Chinese word segmentation (search mode)
    Jieba,
}

impl TokenizerKind {
    fn build(self) -> Arc<dyn Tokenizer> {
        match self {
            TokenizerKind::English => Arc::new(TextTokenizer::english()),
            TokenizerKind::Plain => Arc::new(TextTokenizer::plain()),
            TokenizerKind::Jieba => Arc::new(JiebaTokenizer::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents against one or more queries
    Query {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Query text; repeat for several queries
        #[arg(short, long = "query", required = true)]
        queries: Vec<String>,
        /// Candidates returned besides the best match
        #[arg(long)]
        top_k: Option<usize>,
        /// Minimum score (exclusive) for a best match, within [0, 1]
        #[arg(long)]
        threshold: Option<f64>,
        /// Expand queries the tokenizer cannot split
        #[arg(long, default_value_t = false)]
        expand: bool,
    },
    /// Print corpus statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of most frequent terms to list
        #[arg(long, default_value_t = 10)]
        top_terms: usize,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    took_s: f64,
    #[serde(flatten)]
    result: QueryResult,
}

#[derive(Serialize)]
struct StatsOutput {
    num_docs: usize,
    num_terms: usize,
    avg_doc_length: f64,
    top_terms: Vec<(String, u32)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { corpus, queries, top_k, threshold, expand } => {
            let engine = load_engine(&corpus).await?;
            let mut opts = engine.config().query;
            if let Some(k) = top_k { opts.top_k_candidates = k; }
            if let Some(t) = threshold { opts.threshold = t; }
            opts.expand_query |= expand;
            run_queries(&engine, &queries, &opts).await
        }
        Commands::Stats { corpus, top_terms } => {
            let engine = load_engine(&corpus).await?;
            print_stats(&engine, top_terms)
        }
    }
}

fn load_config(args: &CorpusArgs) -> Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
            EngineConfig::from_json(&raw)?
        }
        None => EngineConfig::from_env()?,
    };
    if let Some(size) = args.chunk_size { cfg.chunk_size = size; }
    Ok(cfg)
}

async fn load_engine(args: &CorpusArgs) -> Result<SearchEngine> {
    let cfg = load_config(args)?;
    let engine = SearchEngine::with_scheduler(cfg, Arc::new(TokioYield));
    spawn_event_logger(&engine);

    let kind = args.tokenizer;
    engine.initialize_tokenizer(async move { Ok(kind.build()) }).await?;

    let docs = input::load_documents(&args.input)?;
    tracing::info!(num_docs = docs.len(), input = %args.input, "loaded documents");
    engine.build_index_async(docs, AsyncBuildOptions::default())?.await?;
    Ok(engine)
}

fn spawn_event_logger(engine: &SearchEngine) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EngineEvent::Progress(p)) => tracing::info!(progress = %format!("{:.0}%", p * 100.0), "indexing"),
                Ok(EngineEvent::IndexReady { documents }) => tracing::info!(documents, "index ready"),
                Ok(EngineEvent::TokenizerReady) => tracing::debug!("tokenizer ready"),
                Ok(EngineEvent::Error(err)) => tracing::error!(%err, "engine error"),
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn run_queries(engine: &SearchEngine, queries: &[String], opts: &QueryOptions) -> Result<()> {
    for query in queries {
        let start = Instant::now();
        let result = engine.query_async(query, opts).await?;
        let out = QueryOutput { query, took_s: start.elapsed().as_secs_f64(), result };
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

fn print_stats(engine: &SearchEngine, top_terms: usize) -> Result<()> {
    let corpus = engine.corpus().context("index was not built")?;
    let index = corpus.index();
    let mut terms: Vec<(String, u32)> = index.document_frequency.iter().map(|(t, df)| (t.clone(), *df)).collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms.truncate(top_terms);

    let out = StatsOutput {
        num_docs: corpus.documents().len(),
        num_terms: index.term_count(),
        avg_doc_length: index.avg_doc_length,
        top_terms: terms,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
