//! In-memory token metadata cache with TTL expiry and explicit
//! negative-caching.
//!
//! A lookup distinguishes three states: a fresh value, a fresh "we asked,
//! there is nothing" record, and no record at all. Time runs on
//! `tokio::time::Instant` so paused-clock tests can advance it.

use std::collections::HashMap;
use std::time::Duration;

use folio_common::types::TokenAttributes;
use tokio::time::Instant;

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Fresh entry with data.
    Hit(TokenAttributes),
    /// Fresh entry recording that the upstream has no data for this key.
    NegativeHit,
    /// No entry, or the entry expired.
    Miss,
}

struct CacheEntry {
    value: Option<TokenAttributes>,
    expires_at: Instant,
}

/// TTL-based metadata cache keyed by `"{network}-{address}"`.
#[derive(Default)]
pub struct TokenCache {
    entries: HashMap<String, CacheEntry>,
}

/// Canonical cache key — the address is lowercased so checksummed and
/// plain spellings share one entry.
pub fn cache_key(network: &str, address: &str) -> String {
    format!("{}-{}", network, address.to_lowercase())
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> CacheLookup {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => match &entry.value {
                Some(attrs) => CacheLookup::Hit(attrs.clone()),
                None => CacheLookup::NegativeHit,
            },
            _ => CacheLookup::Miss,
        }
    }

    pub fn insert_success(&mut self, key: String, attrs: TokenAttributes, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value: Some(attrs),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn insert_negative(&mut self, key: String, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value: None,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn evict(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every expired entry. Callers may run this opportunistically;
    /// correctness never depends on it.
    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
