//! Feed error types

use thiserror::Error;

/// Errors internal to the feed layer.
///
/// None of these ever reach a gateway client directly: upstream problems
/// are folded into failure-shaped `SecurityQuote`s, and store problems
/// trigger pass-through degradation.
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP transport error talking to the upstream feed
    #[error("Upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream returned a non-success status
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// The whole-call timeout elapsed
    #[error("Upstream call timed out")]
    Timeout,

    /// Cache backing store unavailable
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal error
    #[error("Internal feed error: {0}")]
    Internal(String),
}
