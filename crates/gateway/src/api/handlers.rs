//! Gateway request handlers
//!
//! Request validation happens entirely up front: a malformed pair or tenor
//! is rejected with 400 before any upstream call. Once a request is
//! well-formed, upstream and cache failures never turn into HTTP errors;
//! they surface inside the envelope as per-security failures and the
//! `partial` flag.

use axum::extract::{Path, State};
use axum::Json;
use common::{CurrencyPair, SecurityQuote, Tenor};
use feed::{CacheKey, QuoteCache, TerminalFeed};
use market_data::{assemble, surface_tickers, Surface, VolatilityPoint};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{GatewayError, Result};

/// Shared gateway state, constructed once at startup.
pub struct GatewayApiState {
    pub feed: Arc<dyn TerminalFeed>,
    pub cache: Arc<QuoteCache>,
    /// Pairs the gateway will serve surfaces for
    pub pairs: Vec<CurrencyPair>,
    /// Fields requested from the upstream when the caller names none
    pub default_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceRequest {
    pub securities: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReferenceResponse {
    pub securities_data: Vec<SecurityQuote>,
}

/// Raw layer of the surface envelope, kept for fallback consumers that
/// predate the assembled layer.
#[derive(Debug, Serialize)]
pub struct RawLayer {
    pub data: ReferenceResponse,
}

#[derive(Debug, Serialize)]
pub struct SurfaceLayer {
    pub points: Vec<VolatilityPoint>,
    pub partial: bool,
}

#[derive(Debug, Serialize)]
pub struct SurfaceEnvelope {
    pub success: bool,
    pub pair: CurrencyPair,
    /// Echo of the requested tenors, verbatim
    pub tenors: Vec<Tenor>,
    pub data: RawLayer,
    pub surface: SurfaceLayer,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: bool,
    pub upstream: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// `POST /reference` - raw pass-through to the cached upstream feed.
///
/// Never fails the batch for one bad security; each entry carries its own
/// success flag.
pub async fn reference_handler(
    State(state): State<Arc<GatewayApiState>>,
    Json(req): Json<ReferenceRequest>,
) -> Result<Json<ReferenceResponse>> {
    if req.securities.is_empty() {
        return Ok(Json(ReferenceResponse {
            securities_data: Vec::new(),
        }));
    }

    let fields = if req.fields.is_empty() {
        state.default_fields.clone()
    } else {
        req.fields
    };

    debug!(
        securities = req.securities.len(),
        fields = fields.len(),
        "Reference request"
    );

    let key = CacheKey::for_request("reference", &req.securities, &fields);
    let feed = state.feed.clone();
    let securities = req.securities;
    let quotes = state
        .cache
        .get_or_fetch(key, move || async move {
            feed.fetch(&securities, &fields).await
        })
        .await;

    Ok(Json(ReferenceResponse {
        securities_data: quotes,
    }))
}

/// `POST /volatility-surface/:pair` - assembled volatility surface.
///
/// Body is an ordered list of tenor names. The full cross-product of
/// tenors x {ATM, RR, BF per delta} is fetched in one batched call and
/// assembled into an ordered surface.
pub async fn surface_handler(
    State(state): State<Arc<GatewayApiState>>,
    Path(pair): Path<String>,
    Json(tenor_names): Json<Vec<String>>,
) -> Result<Json<SurfaceEnvelope>> {
    let pair = CurrencyPair::parse(&pair)
        .map_err(|e| GatewayError::invalid_request(e.to_string()))?;
    if !state.pairs.contains(&pair) {
        return Err(GatewayError::invalid_request(format!(
            "Unsupported pair: {pair}"
        )));
    }
    if tenor_names.is_empty() {
        return Err(GatewayError::invalid_request("No tenors requested"));
    }
    let tenors = tenor_names
        .iter()
        .map(|name| {
            Tenor::parse(name).map_err(|e| GatewayError::invalid_request(e.to_string()))
        })
        .collect::<Result<Vec<Tenor>>>()?;

    let tickers = surface_tickers(&pair, &tenors);
    let fields = state.default_fields.clone();
    let key = CacheKey::for_request(pair.as_str(), &tickers, &fields);

    info!(%pair, tenors = tenors.len(), securities = tickers.len(), "Surface request");

    let feed = state.feed.clone();
    let fetch_tickers = tickers;
    let fetch_fields = fields;
    let quotes = state
        .cache
        .get_or_fetch(key, move || async move {
            feed.fetch(&fetch_tickers, &fetch_fields).await
        })
        .await;

    let surface = assemble(&pair, &tenors, &quotes);

    Ok(Json(envelope(surface, quotes)))
}

/// `GET /health` - liveness plus cache/upstream degradation flags.
pub async fn health_handler(
    State(state): State<Arc<GatewayApiState>>,
) -> Json<HealthResponse> {
    let cache = state.cache.store_healthy();
    let upstream = state.feed.is_healthy();
    let status = if cache && upstream { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        cache,
        upstream,
        timestamp: chrono::Utc::now(),
    })
}

fn envelope(surface: Surface, quotes: Vec<SecurityQuote>) -> SurfaceEnvelope {
    SurfaceEnvelope {
        success: true,
        pair: surface.pair,
        tenors: surface.requested_tenors,
        data: RawLayer {
            data: ReferenceResponse {
                securities_data: quotes,
            },
        },
        surface: SurfaceLayer {
            points: surface.points,
            partial: surface.partial,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::QuoteFields;
    use feed::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockFeed {
        calls: AtomicUsize,
        healthy: bool,
    }

    impl MockFeed {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                healthy: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TerminalFeed for MockFeed {
        async fn fetch(&self, tickers: &[String], _fields: &[String]) -> Vec<SecurityQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tickers
                .iter()
                .map(|ticker| SecurityQuote {
                    ticker: ticker.clone(),
                    fields: QuoteFields {
                        px_last: None,
                        px_bid: Some(7.24),
                        px_ask: Some(7.55),
                    },
                    success: true,
                    error: None,
                })
                .collect()
        }

        fn is_healthy(&self) -> bool {
            self.healthy
        }
    }

    fn state_with(feed: Arc<MockFeed>) -> Arc<GatewayApiState> {
        let store = Arc::new(InMemoryStore::new(64));
        let cache = Arc::new(QuoteCache::new(store, Duration::from_secs(10)));
        Arc::new(GatewayApiState {
            feed,
            cache,
            pairs: vec![
                CurrencyPair::parse("EURUSD").unwrap(),
                CurrencyPair::parse("GBPUSD").unwrap(),
            ],
            default_fields: vec![
                "PX_LAST".to_string(),
                "PX_BID".to_string(),
                "PX_ASK".to_string(),
            ],
        })
    }

    #[tokio::test]
    async fn test_surface_happy_path() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let Json(envelope) = surface_handler(
            State(state),
            Path("EURUSD".to_string()),
            Json(vec!["1M".to_string(), "3M".to_string()]),
        )
        .await
        .unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.pair.as_str(), "EURUSD");
        assert_eq!(envelope.tenors, vec![Tenor::M1, Tenor::M3]);
        // 2 tenors x 9 quote kinds
        assert_eq!(envelope.data.data.securities_data.len(), 18);
        assert_eq!(envelope.surface.points.len(), 2);
        assert!(!envelope.surface.partial);
        assert_eq!(envelope.surface.points[0].atm_mid(), Some(7.395));
        assert_eq!(feed.call_count(), 1);
    }

    #[tokio::test]
    async fn test_surface_rejects_bad_pair_before_upstream() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let result = surface_handler(
            State(state),
            Path("EURUS".to_string()),
            Json(vec!["1M".to_string()]),
        )
        .await;

        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        assert_eq!(feed.call_count(), 0);
    }

    #[tokio::test]
    async fn test_surface_rejects_unknown_pair() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let result = surface_handler(
            State(state),
            Path("XAUXAG".to_string()),
            Json(vec!["1M".to_string()]),
        )
        .await;

        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        assert_eq!(feed.call_count(), 0);
    }

    #[tokio::test]
    async fn test_surface_rejects_bad_tenor_before_upstream() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let result = surface_handler(
            State(state),
            Path("EURUSD".to_string()),
            Json(vec!["1M".to_string(), "5X".to_string()]),
        )
        .await;

        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        assert_eq!(feed.call_count(), 0);
    }

    #[tokio::test]
    async fn test_surface_rejects_empty_tenor_list() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let result =
            surface_handler(State(state), Path("EURUSD".to_string()), Json(Vec::new())).await;

        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        assert_eq!(feed.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repeat_surface_request_is_served_from_cache() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        for _ in 0..3 {
            surface_handler(
                State(state.clone()),
                Path("EURUSD".to_string()),
                Json(vec!["1M".to_string()]),
            )
            .await
            .unwrap();
        }

        assert_eq!(feed.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reference_passes_through() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let Json(response) = reference_handler(
            State(state),
            Json(ReferenceRequest {
                securities: vec!["EURUSDV1M BGN Curncy".to_string()],
                fields: Vec::new(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.securities_data.len(), 1);
        assert!(response.securities_data[0].success);
        assert_eq!(feed.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reference_empty_securities_skips_upstream() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed.clone());

        let Json(response) = reference_handler(
            State(state),
            Json(ReferenceRequest {
                securities: Vec::new(),
                fields: Vec::new(),
            }),
        )
        .await
        .unwrap();

        assert!(response.securities_data.is_empty());
        assert_eq!(feed.call_count(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed);

        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health.status, "ok");
        assert!(health.cache);
        assert!(health.upstream);
    }

    #[tokio::test]
    async fn test_health_reports_degraded_upstream() {
        let feed = Arc::new(MockFeed {
            calls: AtomicUsize::new(0),
            healthy: false,
        });
        let state = state_with(feed);

        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health.status, "degraded");
        assert!(!health.upstream);
    }

    #[tokio::test]
    async fn test_envelope_serialization_shape() {
        let feed = Arc::new(MockFeed::new());
        let state = state_with(feed);

        let Json(envelope) = surface_handler(
            State(state),
            Path("EURUSD".to_string()),
            Json(vec!["1M".to_string()]),
        )
        .await
        .unwrap();

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["pair"], "EURUSD");
        assert_eq!(value["tenors"][0], "1M");
        assert!(value["data"]["data"]["securities_data"].is_array());
        assert_eq!(value["surface"]["partial"], false);
        assert_eq!(value["surface"]["points"][0]["tenor"], "1M");
    }
}
