//! Cooperative yield points for the chunked builder.
//!
//! The chunked builder suspends between slices through a [`Scheduler`] so a
//! single-threaded host can service other work. Hosts without a cooperative
//! primitive use [`Immediate`], which continues without suspending.

use async_trait::async_trait;

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Give the host a chance to run other work before continuing.
    async fn yield_now(&self);
}

/// Continues immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

#[async_trait]
impl Scheduler for Immediate {
    async fn yield_now(&self) {}
}

/// Yields to the tokio scheduler between slices.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioYield;

#[async_trait]
impl Scheduler for TokioYield {
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}
