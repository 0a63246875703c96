//! In-memory cache for scraped responses.
//!
//! Every cache miss costs a full browser session under the global lock, so
//! results are kept for the same window the shared cache headers advertise.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::models::{CanonicalListing, PostDetail};

/// Default TTL for cached responses (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Detail entries kept before expired ones are pruned.
const DETAIL_PRUNE_THRESHOLD: usize = 256;

/// A cached value with expiration time.
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn get(&self) -> Option<T> {
        if self.is_expired() {
            None
        } else {
            Some(self.value.clone())
        }
    }
}

/// Cache for the list response and per-id detail responses.
pub struct ResponseCache {
    listings: RwLock<Option<CacheEntry<Arc<Vec<CanonicalListing>>>>>,
    details: RwLock<HashMap<String, CacheEntry<PostDetail>>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            listings: RwLock::new(None),
            details: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cached listings, or None if expired/missing.
    pub fn get_listings(&self) -> Option<Arc<Vec<CanonicalListing>>> {
        self.listings
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|e| e.get()))
    }

    /// Store listings and return the shared copy.
    pub fn set_listings(&self, listings: Vec<CanonicalListing>) -> Arc<Vec<CanonicalListing>> {
        let listings = Arc::new(listings);
        if self.ttl.is_zero() {
            return listings;
        }
        if let Ok(mut guard) = self.listings.write() {
            *guard = Some(CacheEntry::new(listings.clone(), self.ttl));
        }
        listings
    }

    /// Get a cached detail, or None if expired/missing.
    pub fn get_detail(&self, id: &str) -> Option<PostDetail> {
        self.details
            .read()
            .ok()
            .and_then(|guard| guard.get(id).and_then(|e| e.get()))
    }

    pub fn set_detail(&self, id: String, detail: PostDetail) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut guard) = self.details.write() {
            guard.insert(id, CacheEntry::new(detail, self.ttl));
            if guard.len() > DETAIL_PRUNE_THRESHOLD {
                guard.retain(|_, entry| !entry.is_expired());
            }
        }
    }

    /// Drop everything.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.listings.write() {
            *guard = None;
        }
        if let Ok(mut guard) = self.details.write() {
            guard.clear();
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
