//! Memoization of resolved listings.
//!
//! Cached listings are keyed by the exact normalized segment list. Expiry is
//! a lazy sweep on lookup rather than a background timer; a refresh that
//! swaps any mount's entries clears the cache wholesale, since entry
//! identity has changed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::ResultNode;

struct CachedListing {
    results: Vec<ResultNode>,
    inserted_at: Instant,
}

/// TTL cache for resolved listings.
pub struct ResultCache {
    expiry: Duration,
    listings: HashMap<Vec<String>, CachedListing>,
}

impl ResultCache {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            listings: HashMap::new(),
        }
    }

    /// Evicts expired listings, then returns the cached listing for
    /// `segments` if one survives.
    pub fn get(&mut self, segments: &[String]) -> Option<Vec<ResultNode>> {
        let expiry = self.expiry;
        self.listings
            .retain(|_, cached| cached.inserted_at.elapsed() < expiry);
        self.listings
            .get(segments)
            .map(|cached| cached.results.clone())
    }

    pub fn insert(&mut self, segments: Vec<String>, results: Vec<ResultNode>) {
        self.listings.insert(
            segments,
            CachedListing {
                results,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.listings.clear();
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
