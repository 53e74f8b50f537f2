//! Least-used token selection with lazy periodic reset
//!
//! The pool owns a fixed set of tokens (ids 1..=N) inside a `UsageHeap`. Every
//! selection pops the least-used token, bumps it, and pushes it back. Before
//! popping, the pool checks whether the reset interval has elapsed since the
//! last reset and, if so, zeroes every usage count.
//!
//! The reset is poll-on-access: it only fires as a side effect of a selection.
//! A pool that sees no traffic keeps its counts past the interval.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::heap::{Token, TokenId, UsageHeap};

/// Pool size used by the operator driver when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 1000;

/// Wall-clock period after which all usage counts are zeroed.
pub const DEFAULT_RESET_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How a simulated operation accounts for usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationMode {
    /// Select, then report one more unit of usage on the returned token.
    /// Each simulated operation counts twice.
    #[default]
    CallerIncrement,
    /// Select only. Each simulated operation counts once.
    SingleIncrement,
}

/// A fixed-size pool of tokens handed out least-used first.
#[derive(Debug)]
pub struct TokenPool {
    tokens: UsageHeap,
    last_reset: Instant,
    reset_interval: Duration,
}

impl TokenPool {
    /// Create a pool of `size` tokens with the default 24 hour reset interval.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_reset_interval(size, DEFAULT_RESET_INTERVAL)
    }

    /// Create a pool of `size` tokens, ids `1..=size`, all with zero usage.
    ///
    /// Fails with `InvalidPoolSize` for an empty pool. Sizes beyond the id
    /// range (`u32::MAX`) are rejected the same way.
    pub fn with_reset_interval(size: usize, reset_interval: Duration) -> Result<Self> {
        let max_id = TokenId::try_from(size).map_err(|_| Error::InvalidPoolSize(size))?;
        if max_id == 0 {
            return Err(Error::InvalidPoolSize(size));
        }

        let tokens = UsageHeap::from_tokens((1..=max_id).map(Token::new).collect());
        metrics::gauge!("token_pool_tokens").set(size as f64);
        info!(
            tokens = size,
            reset_interval_secs = reset_interval.as_secs(),
            "token pool initialized"
        );

        Ok(Self {
            tokens,
            last_reset: Instant::now(),
            reset_interval,
        })
    }

    /// Hand out the least-used token, counting one use against it.
    ///
    /// Runs the lazy reset check first, so the first selection after the
    /// interval elapses starts from zeroed counts.
    pub fn select_token(&mut self) -> Result<Token> {
        self.reset_check();

        let mut token = self.tokens.extract_min()?;
        token.increment();
        self.tokens.insert(token.clone());

        metrics::counter!("token_pool_selections_total").increment(1);
        debug!(token_id = token.id(), usage = token.usage(), "token selected");
        Ok(token)
    }

    /// Report additional usage for a token the caller already holds.
    ///
    /// Applied in place, so heap order is preserved. Returns the token as it
    /// stands after the update.
    pub fn record_usage(&mut self, id: TokenId, amount: u64) -> Result<Token> {
        let token = self
            .tokens
            .increase(id, amount)
            .cloned()
            .ok_or(Error::NotFound(id))?;
        metrics::counter!("token_pool_reported_usage_total").increment(amount);
        Ok(token)
    }

    /// Every token whose usage equals the current minimum, in id order.
    ///
    /// Scans all tokens rather than reading the heap root, since the root is
    /// only one of possibly many tied minimums.
    pub fn least_used_tokens(&self) -> Vec<Token> {
        let Some(min) = self.tokens.iter().map(Token::usage).min() else {
            return Vec::new();
        };
        let mut least: Vec<Token> = self
            .tokens
            .iter()
            .filter(|t| t.usage() == min)
            .cloned()
            .collect();
        least.sort_by_key(Token::id);
        least
    }

    /// Snapshot of every token in id order.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self.tokens.iter().cloned().collect();
        tokens.sort_by_key(Token::id);
        tokens
    }

    /// Id-ordered usage listing plus the least-used set. Read-only.
    pub fn stats_report(&self) -> StatsReport {
        let per_token = self.tokens();
        let least_used = self.least_used_tokens();
        let min_usage = least_used.first().map(Token::usage).unwrap_or(0);
        let max_usage = per_token.iter().map(Token::usage).max().unwrap_or(0);
        let total_usage = per_token.iter().map(Token::usage).sum();
        StatsReport {
            per_token,
            least_used,
            min_usage,
            max_usage,
            total_usage,
        }
    }

    /// Run `count` simulated operations with caller-side double counting.
    pub fn simulate(&mut self, count: i64) -> Result<usize> {
        self.simulate_with(count, SimulationMode::CallerIncrement)
    }

    /// Run `count` simulated operations. Negative counts perform nothing.
    ///
    /// Returns the number of selections performed.
    pub fn simulate_with(&mut self, count: i64, mode: SimulationMode) -> Result<usize> {
        let Ok(count) = usize::try_from(count) else {
            warn!(count, "negative operation count, nothing to simulate");
            return Ok(0);
        };
        info!(operations = count, ?mode, "starting simulation");
        for _ in 0..count {
            self.simulate_step(mode)?;
        }
        Ok(count)
    }

    /// One simulated operation: a selection, plus the caller-side bump when
    /// `mode` asks for it.
    pub fn simulate_step(&mut self, mode: SimulationMode) -> Result<Token> {
        let token = self.select_token()?;
        match mode {
            SimulationMode::CallerIncrement => self.record_usage(token.id(), 1),
            SimulationMode::SingleIncrement => Ok(token),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn reset_interval(&self) -> Duration {
        self.reset_interval
    }

    /// When usage counts were last zeroed (construction counts as a reset).
    pub fn last_reset(&self) -> Instant {
        self.last_reset
    }

    /// Zero every usage count if the reset interval has elapsed.
    fn reset_check(&mut self) {
        let elapsed = self.last_reset.elapsed();
        if elapsed < self.reset_interval {
            return;
        }
        self.tokens.zero_usage();
        self.last_reset = Instant::now();
        metrics::counter!("token_pool_resets_total").increment(1);
        info!(
            tokens = self.tokens.len(),
            elapsed_secs = elapsed.as_secs(),
            "reset interval elapsed, usage counts zeroed"
        );
    }

    #[cfg(test)]
    pub(crate) fn heap(&self) -> &UsageHeap {
        &self.tokens
    }
}

/// Usage for every token, plus the tokens tied for least used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub per_token: Vec<Token>,
    pub least_used: Vec<Token>,
    pub min_usage: u64,
    pub max_usage: u64,
    pub total_usage: u64,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nToken Usage Statistics:")?;
        for t in &self.per_token {
            writeln!(f, "Token {}: {} uses", t.id(), t.usage())?;
        }
        writeln!(f, "\nLeast Used Token(s):")?;
        for t in &self.least_used {
            writeln!(f, "Token {} ({} uses)", t.id(), t.usage())?;
        }
        Ok(())
    }
}
