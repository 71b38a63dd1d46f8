//! Volatility surface shapes
//!
//! Absence of a side is always distinct from zero: a missing bid means the
//! terminal did not quote it. Mids are computed at read time only when both
//! sides are present, so a one-sided quote never produces a stale midpoint.

use common::{CurrencyPair, DeltaBucket, Tenor};
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::BTreeMap;

/// A two-sided quote level; either side may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SidedQuote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
}

impl SidedQuote {
    pub fn new(bid: Option<f64>, ask: Option<f64>) -> Self {
        Self { bid, ask }
    }

    /// Midpoint, available only when both sides were quoted
    pub fn mid(&self) -> Option<f64> {
        Some((self.bid? + self.ask?) / 2.0)
    }

    /// True when neither side was quoted
    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }
}

impl Serialize for SidedQuote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            #[serde(skip_serializing_if = "Option::is_none")]
            bid: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            ask: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            mid: Option<f64>,
        }
        Wire {
            bid: self.bid,
            ask: self.ask,
            mid: self.mid(),
        }
        .serialize(serializer)
    }
}

/// One tenor's worth of volatility quotes.
///
/// Any field may be absent if the underlying security quote failed or was
/// not requested.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityPoint {
    pub tenor: Tenor,
    /// At-the-money level
    pub atm: SidedQuote,
    /// Risk reversals keyed by delta bucket
    pub rr: BTreeMap<DeltaBucket, SidedQuote>,
    /// Butterflies keyed by delta bucket
    pub bf: BTreeMap<DeltaBucket, SidedQuote>,
}

impl VolatilityPoint {
    pub fn new(tenor: Tenor) -> Self {
        Self {
            tenor,
            atm: SidedQuote::default(),
            rr: BTreeMap::new(),
            bf: BTreeMap::new(),
        }
    }

    pub fn atm_bid(&self) -> Option<f64> {
        self.atm.bid
    }

    pub fn atm_ask(&self) -> Option<f64> {
        self.atm.ask
    }

    pub fn atm_mid(&self) -> Option<f64> {
        self.atm.mid()
    }
}

impl Serialize for VolatilityPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            tenor: Tenor,
            #[serde(skip_serializing_if = "Option::is_none")]
            atm_bid: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            atm_ask: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            atm_mid: Option<f64>,
            rr: &'a BTreeMap<DeltaBucket, SidedQuote>,
            bf: &'a BTreeMap<DeltaBucket, SidedQuote>,
        }
        Wire {
            tenor: self.tenor,
            atm_bid: self.atm.bid,
            atm_ask: self.atm.ask,
            atm_mid: self.atm.mid(),
            rr: &self.rr,
            bf: &self.bf,
        }
        .serialize(serializer)
    }
}

/// An assembled volatility surface for one currency pair.
///
/// `points` is sorted by tenor ordinal and never contains two entries for
/// the same tenor. `requested_tenors` echoes the request verbatim so
/// callers can distinguish "not requested" from "requested but empty".
#[derive(Debug, Clone, Serialize)]
pub struct Surface {
    pub pair: CurrencyPair,
    pub requested_tenors: Vec<Tenor>,
    pub points: Vec<VolatilityPoint>,
    /// True when any contributing security quote failed
    pub partial: bool,
}
