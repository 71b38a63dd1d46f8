//! Market data assembly for fxgate
//!
//! This crate turns flat lists of raw security quotes into a structured,
//! tenor-indexed FX volatility surface.
//!
//! # Core Components
//!
//! - [`ticker`] - encode/decode between (pair, tenor, quote kind) and the
//!   upstream's flat security-identifier grammar
//! - [`assembler`] - partial-failure-tolerant grouping of decoded quotes
//!   into an ordered surface
//! - [`types`] - volatility point and surface shapes
//!
//! # Key Invariants
//!
//! - `decode(encode(p, t, k)) == (p, t, k)` for every valid combination
//! - Assembled points are strictly increasing by tenor ordinal
//! - A surface never contains two points with the same tenor
//! - Unparseable tickers are skipped and logged, never fatal

pub mod assembler;
pub mod ticker;
pub mod types;

pub use assembler::assemble;
pub use ticker::{decode, encode, surface_tickers, DecodedTicker};
pub use types::{SidedQuote, Surface, VolatilityPoint};
