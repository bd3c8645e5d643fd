//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Debrid requests (per operation and result)
//! - Readiness polling outcomes
//! - Resolution cache lookups
//! - Stream resolution outcomes

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

// =============================================================================
// Debrid Service
// =============================================================================

/// Debrid API requests by operation and result.
pub static DEBRID_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pacebox_debrid_requests_total",
            "Total requests to the debrid service",
        ),
        &["operation", "result"], // "createtorrent"/"mylist"/"requestdl", "ok" or error kind
    )
    .unwrap()
});

/// Final state of each readiness poll.
pub static POLL_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pacebox_poll_outcomes_total",
            "Readiness poll outcomes",
        ),
        &["state"], // "ready", "timed_out", "failed"
    )
    .unwrap()
});

// =============================================================================
// Resolver
// =============================================================================

/// Resolution cache lookups.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pacebox_cache_lookups_total",
            "Resolution cache lookups",
        ),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Stream resolutions by outcome.
pub static RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pacebox_resolutions_total",
            "Stream resolutions by outcome",
        ),
        &["outcome"], // "playable", "processing", "no_api_key", "not_found", ...
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DEBRID_REQUESTS.clone()),
        Box::new(POLL_OUTCOMES.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(RESOLUTIONS.clone()),
    ]
}
