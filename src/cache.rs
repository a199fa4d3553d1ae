//! In-process TTL cache for computed recommendation lists.
//!
//! Cache keys follow the pattern:
//! - related:{target_id}:{algorithm}:{limit}
//! - personalized:{user_id}:{limit}:{days}
//!
//! Expired entries are not deleted eagerly: a read past the TTL is treated as
//! a miss by the caller and the slot is overwritten on the next compute.
//! `clear` is the only way to force invalidation before expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::models::ScoredResult;

/// A stored result list with its creation instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<ScoredResult>,
    pub created_at: Instant,
}

impl CacheEntry {
    /// Whether this entry is still within the TTL window.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub ttl_secs: u64,
}

/// TTL-keyed store for computed result lists.
///
/// The cache itself does not enforce expiry on reads; callers check
/// `entry.is_fresh(ttl)` before trusting a stored value.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a stored entry; freshness is the caller's decision.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Store a computed result list, overwriting any previous entry.
    pub fn put(&mut self, key: String, value: Vec<ScoredResult>) {
        debug!(key = %key, entries = value.len(), "cached result list");
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Drop all entries unconditionally.
    pub fn clear(&mut self) {
        debug!(dropped = self.entries.len(), "cleared result cache");
        self.entries.clear();
    }

    /// Classify every stored key as valid or expired at call time.
    pub fn stats(&self) -> CacheStats {
        let valid = self
            .entries
            .values()
            .filter(|entry| entry.is_fresh(self.ttl))
            .count();
        CacheStats {
            total_entries: self.entries.len(),
            valid_entries: valid,
            expired_entries: self.entries.len() - valid,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}
