//! Cache backing stores
//!
//! The cache speaks to its backing store through the [`CacheStore`] trait
//! (get / set-with-expiry semantics). The default store is in-process; a
//! store error is never fatal, it only degrades the cache to pass-through.

use crate::cache::CacheKey;
use crate::error::FeedError;
use async_trait::async_trait;
use common::SecurityQuote;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Key-value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live entry; expired entries read as absent.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<SecurityQuote>>, FeedError>;

    /// Insert or replace an entry with a fresh TTL.
    async fn set(
        &self,
        key: &CacheKey,
        payload: Vec<SecurityQuote>,
        ttl: Duration,
    ) -> Result<(), FeedError>;
}

/// A cached upstream response. Never mutated after creation, only replaced.
struct Entry {
    payload: Vec<SecurityQuote>,
    created_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// In-process cache store.
pub struct InMemoryStore {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    max_entries: usize,
}

impl InMemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Number of entries currently held, including expired ones not yet
    /// evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<SecurityQuote>>, FeedError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.payload.clone()))
    }

    async fn set(
        &self,
        key: &CacheKey,
        payload: Vec<SecurityQuote>,
        ttl: Duration,
    ) -> Result<(), FeedError> {
        let mut entries = self.entries.write().await;

        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            entries.retain(|_, entry| !entry.is_expired());
            if entries.len() >= self.max_entries {
                // Still full of live entries: drop the oldest one
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key.clone(),
            Entry {
                payload,
                created_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }
}
