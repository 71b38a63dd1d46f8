//! Ticker grammar for the upstream terminal feed
//!
//! Volatility securities are identified by flat strings following a fixed
//! grammar, all suffixed with the pricing source and sector:
//!
//! ```text
//! ATM:            {PAIR}V{TENOR} BGN Curncy        EURUSDV1M BGN Curncy
//! Risk reversal:  {PAIR}{D}R{TENOR} BGN Curncy     EURUSD25R1M BGN Curncy
//! Butterfly:      {PAIR}{D}B{TENOR} BGN Curncy     EURUSD10B3M BGN Curncy
//! ```
//!
//! Decoding is the exact inverse of encoding and rejects anything outside
//! the grammar rather than guessing.

use common::{CurrencyPair, DeltaBucket, Error, QuoteKind, Result, Tenor};

/// Pricing source and sector suffix shared by every volatility ticker
const TICKER_SUFFIX: &str = " BGN Curncy";

/// A ticker broken back into its quoting coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTicker {
    pub pair: CurrencyPair,
    pub tenor: Tenor,
    pub kind: QuoteKind,
}

/// Encode quoting coordinates into an upstream security identifier.
///
/// Validation happens at type construction, so encoding is total over the
/// domain types.
pub fn encode(pair: &CurrencyPair, tenor: Tenor, kind: QuoteKind) -> String {
    match kind {
        QuoteKind::Atm => format!("{}V{}{}", pair, tenor, TICKER_SUFFIX),
        QuoteKind::RiskReversal(delta) => {
            format!("{}{}R{}{}", pair, delta.value(), tenor, TICKER_SUFFIX)
        }
        QuoteKind::Butterfly(delta) => {
            format!("{}{}B{}{}", pair, delta.value(), tenor, TICKER_SUFFIX)
        }
    }
}

/// Decode an upstream security identifier back into quoting coordinates.
///
/// Returns `UnparseableTicker` for anything that does not match the grammar
/// exactly; callers are expected to skip (and log) such quotes rather than
/// fail a whole batch.
pub fn decode(ticker: &str) -> Result<DecodedTicker> {
    let unparseable = || Error::UnparseableTicker(ticker.to_string());

    let body = ticker.strip_suffix(TICKER_SUFFIX).ok_or_else(unparseable)?;
    if body.len() < 7 || !body.is_char_boundary(6) {
        return Err(unparseable());
    }

    let (pair_str, rest) = body.split_at(6);
    let pair = CurrencyPair::parse(pair_str).map_err(|_| unparseable())?;

    // ATM: single 'V' marker straight after the pair
    if let Some(tenor_str) = rest.strip_prefix('V') {
        let tenor = Tenor::parse(tenor_str).map_err(|_| unparseable())?;
        return Ok(DecodedTicker {
            pair,
            tenor,
            kind: QuoteKind::Atm,
        });
    }

    // RR/BF: two-digit delta, kind marker, tenor
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 2 {
        return Err(unparseable());
    }
    let delta_value: u8 = digits.parse().map_err(|_| unparseable())?;
    let delta = DeltaBucket::parse(delta_value).map_err(|_| unparseable())?;

    let mut after_delta = rest[digits.len()..].chars();
    let marker = after_delta.next().ok_or_else(unparseable)?;
    let tenor = Tenor::parse(after_delta.as_str()).map_err(|_| unparseable())?;

    let kind = match marker {
        'R' => QuoteKind::RiskReversal(delta),
        'B' => QuoteKind::Butterfly(delta),
        _ => return Err(unparseable()),
    };

    Ok(DecodedTicker { pair, tenor, kind })
}

/// All quote kinds a surface point carries: ATM plus RR/BF at every bucket
pub fn surface_kinds() -> Vec<QuoteKind> {
    let mut kinds = vec![QuoteKind::Atm];
    for delta in DeltaBucket::all() {
        kinds.push(QuoteKind::RiskReversal(delta));
        kinds.push(QuoteKind::Butterfly(delta));
    }
    kinds
}

/// Full cross-product of tenors and quote kinds, in deterministic order.
///
/// This is the ticker set fetched for one volatility-surface request.
pub fn surface_tickers(pair: &CurrencyPair, tenors: &[Tenor]) -> Vec<String> {
    let kinds = surface_kinds();
    let mut tickers = Vec::with_capacity(tenors.len() * kinds.len());
    for &tenor in tenors {
        for &kind in &kinds {
            tickers.push(encode(pair, tenor, kind));
        }
    }
    tickers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(s: &str) -> CurrencyPair {
        CurrencyPair::parse(s).unwrap()
    }

    #[test]
    fn test_encode_atm() {
        let ticker = encode(&pair("EURUSD"), Tenor::M1, QuoteKind::Atm);
        assert_eq!(ticker, "EURUSDV1M BGN Curncy");
    }

    #[test]
    fn test_encode_rr_and_bf() {
        let rr = encode(
            &pair("GBPUSD"),
            Tenor::M3,
            QuoteKind::RiskReversal(DeltaBucket::D25),
        );
        assert_eq!(rr, "GBPUSD25R3M BGN Curncy");

        let bf = encode(
            &pair("USDJPY"),
            Tenor::Y1,
            QuoteKind::Butterfly(DeltaBucket::D10),
        );
        assert_eq!(bf, "USDJPY10B1Y BGN Curncy");
    }

    #[test]
    fn test_round_trip_full_cross_product() {
        let p = pair("EURUSD");
        for tenor in Tenor::all() {
            for kind in surface_kinds() {
                let ticker = encode(&p, tenor, kind);
                let decoded = decode(&ticker).unwrap();
                assert_eq!(decoded.pair, p, "ticker {}", ticker);
                assert_eq!(decoded.tenor, tenor, "ticker {}", ticker);
                assert_eq!(decoded.kind, kind, "ticker {}", ticker);
            }
        }
    }

    #[test]
    fn test_decode_18m_tenor() {
        // The tenor itself starts with digits; must not be confused with a delta
        let decoded = decode("EURUSDV18M BGN Curncy").unwrap();
        assert_eq!(decoded.tenor, Tenor::M18);
        assert_eq!(decoded.kind, QuoteKind::Atm);

        let decoded = decode("EURUSD25R18M BGN Curncy").unwrap();
        assert_eq!(decoded.tenor, Tenor::M18);
        assert_eq!(
            decoded.kind,
            QuoteKind::RiskReversal(DeltaBucket::D25)
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let bad = [
            "",
            "EURUSDV1M",                    // missing suffix
            "EURUSDV1M BGN Equity",         // wrong sector
            "EURUSD1M BGN Curncy",          // no kind marker
            "EURUSDX1M BGN Curncy",         // unknown marker
            "EURUSD99R1M BGN Curncy",       // delta outside buckets
            "EURUSD25R5X BGN Curncy",       // unknown tenor
            "EURUSD25Q1M BGN Curncy",       // unknown kind letter
            "EURUSV1M BGN Curncy",          // 5-letter pair
            "EU1USDV1M BGN Curncy",         // digit inside pair
            "EURUSD2R1M BGN Curncy",        // one-digit delta
            "EURUSD255R1M BGN Curncy",      // three-digit delta
        ];
        for ticker in bad {
            assert!(
                matches!(decode(ticker), Err(Error::UnparseableTicker(_))),
                "expected rejection for {:?}",
                ticker
            );
        }
    }

    #[test]
    fn test_surface_tickers_cross_product() {
        let tickers = surface_tickers(&pair("EURUSD"), &[Tenor::M1, Tenor::M3]);
        // ATM + 4 RR + 4 BF per tenor
        assert_eq!(tickers.len(), 2 * 9);
        assert_eq!(tickers[0], "EURUSDV1M BGN Curncy");
        assert!(tickers.contains(&"EURUSD35B3M BGN Curncy".to_string()));

        // deterministic order
        let again = surface_tickers(&pair("EURUSD"), &[Tenor::M1, Tenor::M3]);
        assert_eq!(tickers, again);
    }
}
