//! Surface assembly from raw security quotes
//!
//! Grouping is tolerant of partial failure: a quote that failed upstream,
//! fails to decode, or belongs to another pair never aborts assembly. The
//! surface instead carries a `partial` flag and simply omits what could not
//! be populated.

use crate::ticker;
use crate::types::{SidedQuote, Surface, VolatilityPoint};
use common::{CurrencyPair, QuoteKind, SecurityQuote, Tenor};
use std::collections::BTreeMap;
use tracing::warn;

/// Group raw quotes into an ordered volatility surface.
///
/// - quotes with unparseable tickers or a pair mismatch are skipped (logged)
/// - tenors with zero contributing quotes are omitted from `points` but kept
///   in `requested_tenors`
/// - `points` comes out sorted strictly ascending by tenor ordinal
/// - `partial` is set iff any quote in the batch had `success == false`
pub fn assemble(
    pair: &CurrencyPair,
    requested_tenors: &[Tenor],
    quotes: &[SecurityQuote],
) -> Surface {
    // BTreeMap keyed by tenor gives ordinal ordering and per-tenor uniqueness
    let mut buckets: BTreeMap<Tenor, VolatilityPoint> = BTreeMap::new();
    let mut partial = false;

    for quote in quotes {
        if !quote.success {
            partial = true;
            continue;
        }

        let decoded = match ticker::decode(&quote.ticker) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(ticker = %quote.ticker, error = %e, "Skipping unparseable ticker");
                continue;
            }
        };

        if decoded.pair != *pair {
            warn!(
                ticker = %quote.ticker,
                expected = %pair,
                got = %decoded.pair,
                "Skipping quote for unexpected pair"
            );
            continue;
        }

        let level = SidedQuote::new(quote.fields.px_bid, quote.fields.px_ask);
        let point = buckets
            .entry(decoded.tenor)
            .or_insert_with(|| VolatilityPoint::new(decoded.tenor));

        match decoded.kind {
            QuoteKind::Atm => point.atm = level,
            QuoteKind::RiskReversal(delta) => {
                point.rr.insert(delta, level);
            }
            QuoteKind::Butterfly(delta) => {
                point.bf.insert(delta, level);
            }
        }
    }

    Surface {
        pair: pair.clone(),
        requested_tenors: requested_tenors.to_vec(),
        points: buckets.into_values().collect(),
        partial,
    }
}
