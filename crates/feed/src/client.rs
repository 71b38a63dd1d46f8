//! Upstream terminal feed client
//!
//! The terminal feed accepts one batched request for many securities and is
//! rate limited, so the client never issues per-ticker calls and caps the
//! number of simultaneous outstanding requests with a semaphore, independent
//! of how many gateway requests are in flight.

use crate::error::FeedError;
use async_trait::async_trait;
use common::SecurityQuote;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// A synchronous request/response source of raw security quotes.
///
/// Implementations always return a response shaped like success: one quote
/// per requested ticker, with failures folded into `success = false`.
#[async_trait]
pub trait TerminalFeed: Send + Sync {
    /// Fetch the given tickers in a single batched call.
    async fn fetch(&self, tickers: &[String], fields: &[String]) -> Vec<SecurityQuote>;

    /// Whether the last upstream interaction succeeded.
    fn is_healthy(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct FeedRequest<'a> {
    securities: &'a [String],
    fields: &'a [String],
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    securities_data: Vec<SecurityQuote>,
}

/// HTTP client for the upstream terminal feed service.
pub struct HttpTerminalClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    semaphore: Arc<Semaphore>,
    healthy: AtomicBool,
}

impl HttpTerminalClient {
    /// Create a client for the feed at `base_url`.
    ///
    /// `timeout` bounds the whole batched call including the single retry;
    /// `max_concurrent` caps simultaneous outstanding calls across all
    /// gateway requests.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            healthy: AtomicBool::new(true),
        })
    }

    async fn post_batch(
        &self,
        tickers: &[String],
        fields: &[String],
    ) -> Result<Vec<SecurityQuote>, FeedError> {
        let url = format!("{}/reference", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&FeedRequest {
                securities: tickers,
                fields,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UpstreamStatus(status.as_u16()));
        }

        let body: FeedResponse = response.json().await?;
        Ok(body.securities_data)
    }

    /// One attempt plus a single retry for transient failures, all within
    /// the caller's timeout budget.
    async fn post_with_retry(
        &self,
        tickers: &[String],
        fields: &[String],
    ) -> Result<Vec<SecurityQuote>, FeedError> {
        match self.post_batch(tickers, fields).await {
            Ok(quotes) => Ok(quotes),
            Err(e) if is_transient(&e) => {
                warn!(error = %e, "Transient upstream failure, retrying once");
                self.post_batch(tickers, fields).await
            }
            Err(e) => Err(e),
        }
    }
}

/// Transient failures are retried once; client errors (4xx) are not.
fn is_transient(e: &FeedError) -> bool {
    match e {
        FeedError::Transport(err) => !err.is_status(),
        FeedError::UpstreamStatus(status) => *status >= 500,
        _ => false,
    }
}

/// One failed quote per requested ticker, all with the same error
fn all_failed(tickers: &[String], error: &str) -> Vec<SecurityQuote> {
    tickers
        .iter()
        .map(|t| SecurityQuote::failed(t.clone(), error))
        .collect()
}

/// Re-align a response with the requested ticker list: one entry per
/// requested ticker, in request order, missing tickers marked failed.
fn normalize(tickers: &[String], quotes: Vec<SecurityQuote>) -> Vec<SecurityQuote> {
    let mut by_ticker: HashMap<String, SecurityQuote> = quotes
        .into_iter()
        .map(|q| (q.ticker.clone(), q))
        .collect();

    tickers
        .iter()
        .map(|t| {
            by_ticker
                .remove(t)
                .unwrap_or_else(|| SecurityQuote::failed(t.clone(), "no data returned"))
        })
        .collect()
}

#[async_trait]
impl TerminalFeed for HttpTerminalClient {
    async fn fetch(&self, tickers: &[String], fields: &[String]) -> Vec<SecurityQuote> {
        if tickers.is_empty() {
            return Vec::new();
        }

        // Bound outstanding upstream calls; acquire only fails if the
        // semaphore is closed, which we never do.
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return all_failed(tickers, "upstream client shut down"),
        };

        debug!(count = tickers.len(), "Fetching batch from upstream feed");

        let result = tokio::time::timeout(self.timeout, self.post_with_retry(tickers, fields)).await;

        match result {
            Ok(Ok(quotes)) => {
                self.healthy.store(true, Ordering::Relaxed);
                normalize(tickers, quotes)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Upstream fetch failed");
                self.healthy.store(false, Ordering::Relaxed);
                all_failed(tickers, &e.to_string())
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Upstream fetch timed out");
                self.healthy.store(false, Ordering::Relaxed);
                all_failed(tickers, "timeout")
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
