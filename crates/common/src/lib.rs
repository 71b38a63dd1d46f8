//! Common types and errors for fxgate
//!
//! This crate provides the domain vocabulary shared by every other crate:
//! currency pairs, tenors, delta buckets, quote kinds, and the raw
//! `SecurityQuote` shape returned by the upstream terminal feed.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{CurrencyPair, DeltaBucket, QuoteFields, QuoteKind, SecurityQuote, Tenor};
