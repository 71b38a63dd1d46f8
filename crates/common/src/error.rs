//! Common error types for fxgate

use thiserror::Error;

/// Common error type used across fxgate crates
#[derive(Error, Debug)]
pub enum Error {
    /// Currency pair is not a valid 6-letter FX code
    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),

    /// Tenor is not one of the supported maturity buckets
    #[error("Invalid tenor: {0}")]
    InvalidTenor(String),

    /// Delta is not one of the quoted delta buckets
    #[error("Invalid delta: {0}")]
    InvalidDelta(u8),

    /// Ticker string does not match the quoting grammar
    #[error("Unparseable ticker: {0}")]
    UnparseableTicker(String),

    /// Invalid input was provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
