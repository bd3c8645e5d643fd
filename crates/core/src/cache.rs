//! In-memory cache of magnet submissions.
//!
//! Submitting the same magnet twice makes the debrid service do redundant
//! work, so the resolver remembers each submission result for a fixed window.
//! Expiry is checked lazily on read; nothing is evicted otherwise.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::debrid::SubmissionResult;
use crate::metrics::CACHE_LOOKUPS;

/// Default entry lifetime (30 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: SubmissionResult,
    inserted_at: Instant,
}

/// Magnet link -> submission result, keyed by the exact magnet string.
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResolutionCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }

    /// Look up a previous submission. Expired entries read as absent.
    pub fn get(&self, magnet: &str) -> Option<SubmissionResult> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let hit = entries
            .get(magnet)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.value.clone());

        let label = if hit.is_some() { "hit" } else { "miss" };
        CACHE_LOOKUPS.with_label_values(&[label]).inc();
        if hit.is_some() {
            debug!("Using cached torrent data");
        }
        hit
    }

    /// Remember a submission, replacing any previous entry.
    pub fn put(&self, magnet: impl Into<String>, value: SubmissionResult) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(magnet.into(), entry);
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored magnet keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| self.is_live(entry, now));
        before - entries.len()
    }
}
