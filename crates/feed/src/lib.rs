//! Upstream feed access for fxgate
//!
//! This crate owns the two components that protect the rate-limited
//! terminal feed:
//!
//! - [`client`] - one batched call per distinct ticker set, with a whole-call
//!   timeout and a semaphore bounding simultaneous outstanding requests
//! - [`cache`] - a TTL cache of raw responses with request coalescing, so
//!   concurrent identical requests produce at most one upstream fetch
//!
//! Only raw quotes are cached; surfaces are reassembled per request.

pub mod cache;
pub mod client;
pub mod error;
pub mod store;

pub use cache::{CacheKey, QuoteCache};
pub use client::{HttpTerminalClient, TerminalFeed};
pub use error::FeedError;
pub use store::{CacheStore, InMemoryStore};

pub type Result<T> = std::result::Result<T, FeedError>;
