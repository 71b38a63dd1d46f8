//! Domain types shared across fxgate
//!
//! The types here mirror the upstream terminal's quoting conventions:
//! volatility is quoted per currency pair, per tenor, as an ATM level plus
//! risk-reversal and butterfly spreads at fixed delta buckets.

use crate::error::Error;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Currency pairs the gateway will quote by default.
///
/// Configuration can extend this list; `CurrencyPair::parse` only enforces
/// shape, membership is checked at the gateway boundary.
pub const DEFAULT_PAIRS: &[&str] = &[
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "AUDUSD", "NZDUSD", "USDCAD", "EURGBP", "EURJPY",
    "GBPJPY", "EURCHF", "AUDJPY",
];

/// A 6-letter FX currency pair (e.g. "EURUSD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair(String);

impl CurrencyPair {
    /// Parse and validate a pair code.
    ///
    /// Accepts exactly six ASCII alphabetic characters, normalized to
    /// uppercase. Membership in the served-pair list is a gateway concern.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.len() == 6 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(Error::InvalidPair(s.to_string()))
        }
    }

    /// Get the pair as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base currency (e.g. EUR in EURUSD)
    pub fn base(&self) -> &str {
        &self.0[..3]
    }

    /// Quote currency (e.g. USD in EURUSD)
    pub fn quote(&self) -> &str {
        &self.0[3..]
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        Self::parse(&s)
    }
}

impl From<CurrencyPair> for String {
    fn from(p: CurrencyPair) -> Self {
        p.0
    }
}

impl std::str::FromStr for CurrencyPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

/// Maturity bucket on the volatility term structure.
///
/// Variants are declared in term order; `ordinal()` gives the sort key used
/// when assembling a surface. Note 18M sits between 1Y and 2Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tenor {
    /// Overnight
    On,
    /// 1 week
    W1,
    /// 2 weeks
    W2,
    /// 1 month
    M1,
    /// 2 months
    M2,
    /// 3 months
    M3,
    /// 6 months
    M6,
    /// 9 months
    M9,
    /// 1 year
    Y1,
    /// 18 months
    M18,
    /// 2 years
    Y2,
}

impl Tenor {
    /// All tenors in term order
    pub fn all() -> [Tenor; 11] {
        [
            Tenor::On,
            Tenor::W1,
            Tenor::W2,
            Tenor::M1,
            Tenor::M2,
            Tenor::M3,
            Tenor::M6,
            Tenor::M9,
            Tenor::Y1,
            Tenor::M18,
            Tenor::Y2,
        ]
    }

    /// Sort key: position on the term structure, ascending maturity
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Wire name as quoted by the upstream terminal
    pub fn as_str(&self) -> &'static str {
        match self {
            Tenor::On => "ON",
            Tenor::W1 => "1W",
            Tenor::W2 => "2W",
            Tenor::M1 => "1M",
            Tenor::M2 => "2M",
            Tenor::M3 => "3M",
            Tenor::M6 => "6M",
            Tenor::M9 => "9M",
            Tenor::Y1 => "1Y",
            Tenor::M18 => "18M",
            Tenor::Y2 => "2Y",
        }
    }

    /// Parse a wire name (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_ascii_uppercase().as_str() {
            "ON" => Ok(Tenor::On),
            "1W" => Ok(Tenor::W1),
            "2W" => Ok(Tenor::W2),
            "1M" => Ok(Tenor::M1),
            "2M" => Ok(Tenor::M2),
            "3M" => Ok(Tenor::M3),
            "6M" => Ok(Tenor::M6),
            "9M" => Ok(Tenor::M9),
            "1Y" => Ok(Tenor::Y1),
            "18M" => Ok(Tenor::M18),
            "2Y" => Ok(Tenor::Y2),
            _ => Err(Error::InvalidTenor(s.to_string())),
        }
    }
}

impl std::fmt::Display for Tenor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tenor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl Serialize for Tenor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tenor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Tenor::parse(&s).map_err(de::Error::custom)
    }
}

/// Option delta at which risk reversals and butterflies are quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeltaBucket {
    /// 10 delta
    D10,
    /// 15 delta
    D15,
    /// 25 delta
    D25,
    /// 35 delta
    D35,
}

impl DeltaBucket {
    /// All delta buckets, ascending
    pub fn all() -> [DeltaBucket; 4] {
        [
            DeltaBucket::D10,
            DeltaBucket::D15,
            DeltaBucket::D25,
            DeltaBucket::D35,
        ]
    }

    /// Numeric delta value
    pub fn value(&self) -> u8 {
        match self {
            DeltaBucket::D10 => 10,
            DeltaBucket::D15 => 15,
            DeltaBucket::D25 => 25,
            DeltaBucket::D35 => 35,
        }
    }

    /// Parse a numeric delta value
    pub fn parse(value: u8) -> Result<Self, Error> {
        match value {
            10 => Ok(DeltaBucket::D10),
            15 => Ok(DeltaBucket::D15),
            25 => Ok(DeltaBucket::D25),
            35 => Ok(DeltaBucket::D35),
            other => Err(Error::InvalidDelta(other)),
        }
    }
}

impl std::fmt::Display for DeltaBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for DeltaBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value().to_string())
    }
}

impl<'de> Deserialize<'de> for DeltaBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let value: u8 = s.parse().map_err(de::Error::custom)?;
        DeltaBucket::parse(value).map_err(de::Error::custom)
    }
}

/// Kind of volatility quote carried by a single security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    /// At-the-money volatility
    Atm,
    /// Risk reversal at a delta bucket
    RiskReversal(DeltaBucket),
    /// Butterfly at a delta bucket
    Butterfly(DeltaBucket),
}

/// Price fields returned by the upstream terminal for one security.
///
/// Absence is distinct from zero: a missing field means the terminal did not
/// quote that side, not that it quoted zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteFields {
    /// Last traded / last quoted level
    #[serde(rename = "PX_LAST", skip_serializing_if = "Option::is_none")]
    pub px_last: Option<f64>,
    /// Bid side
    #[serde(rename = "PX_BID", skip_serializing_if = "Option::is_none")]
    pub px_bid: Option<f64>,
    /// Ask side
    #[serde(rename = "PX_ASK", skip_serializing_if = "Option::is_none")]
    pub px_ask: Option<f64>,
}

/// Raw quote for a single security, as returned by the upstream feed.
///
/// Immutable once created. A failed fetch is represented as
/// `success = false` with an error message, never as a missing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityQuote {
    /// Upstream security identifier (e.g. "EURUSDV1M BGN Curncy")
    pub ticker: String,
    /// Quoted price fields; any may be absent
    #[serde(default)]
    pub fields: QuoteFields,
    /// Whether the upstream returned data for this security
    pub success: bool,
    /// Error description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SecurityQuote {
    /// Build a failed quote for a ticker
    pub fn failed(ticker: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            fields: QuoteFields::default(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_parse() {
        let pair = CurrencyPair::parse("eurusd").unwrap();
        assert_eq!(pair.as_str(), "EURUSD");
        assert_eq!(pair.base(), "EUR");
        assert_eq!(pair.quote(), "USD");

        assert!(CurrencyPair::parse("EURUS").is_err());
        assert!(CurrencyPair::parse("EURUSD1").is_err());
        assert!(CurrencyPair::parse("EUR/US").is_err());
    }

    #[test]
    fn test_tenor_ordering() {
        let all = Tenor::all();
        for pair in all.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
        // 18M sits between 1Y and 2Y
        assert!(Tenor::Y1.ordinal() < Tenor::M18.ordinal());
        assert!(Tenor::M18.ordinal() < Tenor::Y2.ordinal());
    }

    #[test]
    fn test_tenor_round_trip() {
        for tenor in Tenor::all() {
            assert_eq!(Tenor::parse(tenor.as_str()).unwrap(), tenor);
        }
        assert!(Tenor::parse("5X").is_err());
        assert!(Tenor::parse("").is_err());
    }

    #[test]
    fn test_tenor_serde() {
        let json = serde_json::to_string(&Tenor::M18).unwrap();
        assert_eq!(json, "\"18M\"");
        let back: Tenor = serde_json::from_str("\"1M\"").unwrap();
        assert_eq!(back, Tenor::M1);
    }

    #[test]
    fn test_delta_bucket() {
        for bucket in DeltaBucket::all() {
            assert_eq!(DeltaBucket::parse(bucket.value()).unwrap(), bucket);
        }
        assert!(DeltaBucket::parse(50).is_err());
    }

    #[test]
    fn test_security_quote_serde() {
        let json = r#"{
            "ticker": "EURUSDV1M BGN Curncy",
            "fields": {"PX_BID": 7.24, "PX_ASK": 7.55},
            "success": true
        }"#;
        let quote: SecurityQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.fields.px_bid, Some(7.24));
        assert_eq!(quote.fields.px_ask, Some(7.55));
        assert_eq!(quote.fields.px_last, None);
        assert!(quote.success);
        assert!(quote.error.is_none());
    }

    #[test]
    fn test_failed_quote() {
        let quote = SecurityQuote::failed("EURUSDV1M BGN Curncy", "timeout");
        assert!(!quote.success);
        assert_eq!(quote.error.as_deref(), Some("timeout"));
        assert_eq!(quote.fields, QuoteFields::default());
    }
}
