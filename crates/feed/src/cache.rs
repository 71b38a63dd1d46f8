//! Raw-quote cache with request coalescing
//!
//! The cache guarantees that for a given key, at most one upstream fetch is
//! outstanding at any instant. Concurrent cache-miss callers attach to the
//! same in-flight fetch (a per-key `OnceCell`) and all receive its result,
//! so K simultaneous identical requests cost exactly one upstream call.
//!
//! If the backing store is unavailable the cache degrades to direct
//! pass-through rather than failing the request.

use crate::store::CacheStore;
use common::SecurityQuote;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

/// Cache key derived from the canonical request: scope (pair or endpoint),
/// sorted securities, sorted fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_request(scope: &str, securities: &[String], fields: &[String]) -> Self {
        let mut securities = securities.to_vec();
        securities.sort_unstable();
        let mut fields = fields.to_vec();
        fields.sort_unstable();

        let canonical = format!("{}|{}|{}", scope, securities.join(","), fields.join(","));
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Self(format!("{:016x}", hasher.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type InFlight = Arc<OnceCell<Vec<SecurityQuote>>>;

/// Keyed store of recent raw responses plus in-flight fetch coalescing.
///
/// Owned by the gateway as an explicit instance: constructed at startup,
/// dropped at shutdown, no persistence across restarts.
pub struct QuoteCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    in_flight: Mutex<HashMap<CacheKey, InFlight>>,
    store_healthy: AtomicBool,
}

impl QuoteCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
            store_healthy: AtomicBool::new(true),
        }
    }

    /// Whether the backing store served the last operation.
    pub fn store_healthy(&self) -> bool {
        self.store_healthy.load(Ordering::Relaxed)
    }

    /// Return the cached payload for `key`, or fetch it.
    ///
    /// On a miss, the first caller runs `fetch_fn` while any concurrent
    /// callers for the same key wait on the same in-flight cell; everyone
    /// receives the same result. The result is stored with a fresh TTL
    /// before waiters are released from the retired cell.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch_fn: F) -> Vec<SecurityQuote>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<SecurityQuote>> + Send,
    {
        match self.store.get(&key).await {
            Ok(Some(payload)) => {
                self.store_healthy.store(true, Ordering::Relaxed);
                debug!(%key, "Cache hit");
                return payload;
            }
            Ok(None) => {
                self.store_healthy.store(true, Ordering::Relaxed);
            }
            Err(e) => {
                // Store outage: pass through to upstream, never fail the request
                warn!(%key, error = %e, "Cache store unavailable, passing through");
                self.store_healthy.store(false, Ordering::Relaxed);
                return fetch_fn().await;
            }
        }

        // Attach to the in-flight fetch for this key, creating it if we are
        // first. The map lock is held only to clone the cell, never across
        // an await of the fetch itself.
        let cell: InFlight = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.clone()).or_default().clone()
        };

        let payload = cell
            .get_or_init(|| async {
                debug!(%key, "Cache miss, fetching upstream");
                let payload = fetch_fn().await;
                if let Err(e) = self.store.set(&key, payload.clone(), self.ttl).await {
                    warn!(%key, error = %e, "Failed to store fetched payload");
                    self.store_healthy.store(false, Ordering::Relaxed);
                }
                payload
            })
            .await
            .clone();

        // Retire the in-flight slot so the next miss after expiry starts a
        // fresh fetch. Idempotent across all waiters.
        {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(current) = in_flight.get(&key) {
                if Arc::ptr_eq(current, &cell) {
                    in_flight.remove(&key);
                }
            }
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    fn payload(ticker: &str) -> Vec<SecurityQuote> {
        vec![SecurityQuote {
            ticker: ticker.to_string(),
            fields: Default::default(),
            success: true,
            error: None,
        }]
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::for_request(name, &[], &[])
    }

    #[test]
    fn test_key_ignores_input_order() {
        let a = CacheKey::for_request(
            "EURUSD",
            &["B".to_string(), "A".to_string()],
            &["PX_BID".to_string(), "PX_ASK".to_string()],
        );
        let b = CacheKey::for_request(
            "EURUSD",
            &["A".to_string(), "B".to_string()],
            &["PX_ASK".to_string(), "PX_BID".to_string()],
        );
        assert_eq!(a, b);

        let c = CacheKey::for_request("GBPUSD", &["A".to_string()], &[]);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_fetch() {
        let store = Arc::new(InMemoryStore::new(16));
        let cache = QuoteCache::new(store, Duration::from_secs(10));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let got = cache
                .get_or_fetch(key("a"), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    payload("X")
                })
                .await;
            assert_eq!(got[0].ticker, "X");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_coalesce() {
        let store = Arc::new(InMemoryStore::new(16));
        let cache = Arc::new(QuoteCache::new(store, Duration::from_secs(10)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key("a"), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Hold the fetch open long enough for every task to attach
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        payload("X")
                    })
                    .await
            }));
        }

        for handle in handles {
            let got = handle.await.unwrap();
            assert_eq!(got[0].ticker, "X");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let store = Arc::new(InMemoryStore::new(16));
        let cache = Arc::new(QuoteCache::new(store, Duration::from_secs(10)));
        let calls = Arc::new(AtomicUsize::new(0));

        let c1 = calls.clone();
        let a = cache.get_or_fetch(key("a"), move || async move {
            c1.fetch_add(1, Ordering::SeqCst);
            payload("A")
        });
        let c2 = calls.clone();
        let b = cache.get_or_fetch(key("b"), move || async move {
            c2.fetch_add(1, Ordering::SeqCst);
            payload("B")
        });

        let (a, b) = tokio::join!(a, b);
        assert_eq!(a[0].ticker, "A");
        assert_eq!(b[0].ticker, "B");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expiry_triggers_new_fetch() {
        let store = Arc::new(InMemoryStore::new(16));
        let cache = QuoteCache::new(store, Duration::from_millis(30));
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        cache
            .get_or_fetch(key("a"), move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                payload("X")
            })
            .await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        let c = calls.clone();
        cache
            .get_or_fetch(key("a"), move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                payload("Y")
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _: &CacheKey) -> Result<Option<Vec<SecurityQuote>>, FeedError> {
            Err(FeedError::StoreUnavailable("down".into()))
        }

        async fn set(
            &self,
            _: &CacheKey,
            _: Vec<SecurityQuote>,
            _: Duration,
        ) -> Result<(), FeedError> {
            Err(FeedError::StoreUnavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_store_outage_degrades_to_pass_through() {
        let cache = QuoteCache::new(Arc::new(BrokenStore), Duration::from_secs(10));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let got = cache
                .get_or_fetch(key("a"), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    payload("X")
                })
                .await;
            assert_eq!(got[0].ticker, "X");
        }

        // Every request goes upstream, none fail
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.store_healthy());
    }

    #[tokio::test]
    async fn test_failure_shaped_results_are_shared_with_waiters() {
        let store = Arc::new(InMemoryStore::new(16));
        let cache = Arc::new(QuoteCache::new(store, Duration::from_secs(10)));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key("a"), move || async move {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        vec![SecurityQuote::failed("T", "timeout")]
                    })
                    .await
            }));
        }

        for handle in handles {
            let got = handle.await.unwrap();
            assert!(!got[0].success);
            assert_eq!(got[0].error.as_deref(), Some("timeout"));
        }
    }
}
