//! Driver error types

use thiserror::Error;

/// Errors raised while configuring the driver or reading operator input.
///
/// Pool failures are not wrapped here; `main` reports them through `anyhow`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid operation count: {0}")]
    Input(String),
}

/// Result alias using driver Error
pub type Result<T> = std::result::Result<T, Error>;
