//! Least-used token pool
//!
//! Spreads load over a fixed set of interchangeable tokens (API keys,
//! connection slots) by always handing out the one used least since the last
//! reset. Usage counts live in an array-backed min-heap, so selection is
//! O(log n).
//!
//! Token lifecycle:
//! 1. Pool construction creates tokens 1..=N with usage 0
//! 2. `select_token` pops the least-used token, bumps it, pushes it back
//! 3. Callers may report extra usage for a held token via `record_usage`
//! 4. The first selection after the reset interval (24h by default) zeroes all counts
//! 5. Tokens are dropped only with the pool

pub mod error;
pub mod heap;
pub mod pool;
pub mod shared;

pub use error::{Error, Result};
pub use heap::{Token, TokenId, UsageHeap};
pub use pool::{
    DEFAULT_POOL_SIZE, DEFAULT_RESET_INTERVAL, SimulationMode, StatsReport, TokenPool,
};
pub use shared::SharedTokenPool;
