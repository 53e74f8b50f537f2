//! Concurrent access to a single token pool
//!
//! The whole pool (heap layout plus reset timestamp) is one shared resource.
//! Selections and usage reports take the write lock for exactly one call;
//! introspection takes the read lock and therefore never observes a token
//! mid-extraction.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::heap::{Token, TokenId};
use crate::pool::{SimulationMode, StatsReport, TokenPool};

/// Cloneable handle to a pool shared between tasks.
#[derive(Debug, Clone)]
pub struct SharedTokenPool {
    inner: Arc<RwLock<TokenPool>>,
}

impl SharedTokenPool {
    pub fn new(pool: TokenPool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pool)),
        }
    }

    /// Select the least-used token under the write lock.
    pub async fn select_token(&self) -> Result<Token> {
        self.inner.write().await.select_token()
    }

    /// Report additional usage for a held token under the write lock.
    pub async fn record_usage(&self, id: TokenId, amount: u64) -> Result<Token> {
        self.inner.write().await.record_usage(id, amount)
    }

    /// Run `count` simulated operations, locking once per operation so other
    /// callers can interleave. Negative counts perform nothing.
    pub async fn simulate(&self, count: i64, mode: SimulationMode) -> Result<usize> {
        let Ok(count) = usize::try_from(count) else {
            warn!(count, "negative operation count, nothing to simulate");
            return Ok(0);
        };
        info!(operations = count, ?mode, "starting simulation");
        for _ in 0..count {
            self.inner.write().await.simulate_step(mode)?;
        }
        Ok(count)
    }

    pub async fn least_used_tokens(&self) -> Vec<Token> {
        self.inner.read().await.least_used_tokens()
    }

    pub async fn stats_report(&self) -> StatsReport {
        self.inner.read().await.stats_report()
    }

    pub async fn tokens(&self) -> Vec<Token> {
        self.inner.read().await.tokens()
    }
}
