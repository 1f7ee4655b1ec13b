use crate::build::{BuildOptions, DEFAULT_CHUNK_SIZE};
use crate::error::{Result, SearchError};
use crate::query::QueryOptions;
use crate::scoring::Bm25Params;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ID_PREFIX: &str = "doc";
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunk_size: usize,
    pub bm25: Bm25Params,
    /// Prefix for ids generated for documents submitted without one.
    pub id_prefix: String,
    /// Buffered events per subscriber before the oldest are dropped.
    pub event_capacity: usize,
    /// Defaults used by the CLI when no per-query options are given.
    pub query: QueryOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            bm25: Bm25Params::default(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            query: QueryOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `LEXQ_CHUNK_SIZE`, `LEXQ_BM25_K1`, `LEXQ_BM25_B`
    /// and `LEXQ_ID_PREFIX` when set.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = env_parse::<usize>("LEXQ_CHUNK_SIZE")? { cfg.chunk_size = v; }
        if let Some(v) = env_parse::<f64>("LEXQ_BM25_K1")? { cfg.bm25.k1 = v; }
        if let Some(v) = env_parse::<f64>("LEXQ_BM25_B")? { cfg.bm25.b = v; }
        if let Ok(v) = std::env::var("LEXQ_ID_PREFIX") { cfg.id_prefix = v; }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SearchError::InvalidChunkSize);
        }
        if self.event_capacity == 0 {
            return Err(SearchError::Config("event_capacity must be at least 1".into()));
        }
        if self.bm25.k1.is_nan() || self.bm25.k1 < 0.0 || !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(SearchError::Config(format!("bm25 parameters out of range: k1={} b={}", self.bm25.k1, self.bm25.b)));
        }
        self.query.validate()
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions { chunk_size: self.chunk_size, params: self.bm25 }
    }
}

fn env_parse<V: std::str::FromStr>(key: &str) -> Result<Option<V>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SearchError::Config(format!("{key} is not valid: {raw}"))),
        Err(_) => Ok(None),
    }
}
