//! Error types for pool operations

use crate::heap::TokenId;

/// Errors from pool operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token pool is empty")]
    EmptyPool,

    #[error("invalid pool size: {0} (must be greater than 0)")]
    InvalidPoolSize(usize),

    #[error("token not found: {0}")]
    NotFound(TokenId),
}

/// Result alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;
