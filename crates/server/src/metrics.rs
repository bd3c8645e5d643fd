//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the addon server:
//! - HTTP request metrics (latency, counts)
//! - Resolution cache size (collected dynamically)
//! - Core metrics (debrid requests, polling, resolutions)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pacebox_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pacebox_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pacebox_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics (collected dynamically)
// =============================================================================

/// Resolution cache entries, including expired ones not yet purged.
pub static CACHE_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pacebox_cache_entries",
        "Number of entries in the resolution cache",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Cache
    registry.register(Box::new(CACHE_ENTRIES.clone())).unwrap();

    // Core metrics (debrid, poller, cache lookups, resolutions)
    for metric in pacebox_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    CACHE_ENTRIES.set(state.cache().len() as i64);
}

/// Route roots; any other leading segment is a user config segment.
const ROUTE_ROOTS: &[&str] = &[
    "manifest.json",
    "catalog",
    "meta",
    "stream",
    "health",
    "config",
    "metrics",
    "debug",
];

static ITEM_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(meta|stream)/series/[^/]+\.json$").unwrap());

static CATALOG_EXTRA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/catalog/series/([^/]+)/[^/]+$").unwrap());

/// Label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Normalize a path for metric labels.
///
/// The user config segment (which may carry an API key) becomes `{config}` and
/// item ids become `{id}` and catalog extras become `{extra}`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.split_once('/') {
        Some((first, rest)) => (first, format!("/{}", rest)),
        None => (trimmed, String::new()),
    };
    let (prefix, rest) = if first.is_empty() || ROUTE_ROOTS.contains(&first) {
        ("", format!("/{}", trimmed))
    } else {
        ("/{config}", rest)
    };

    let rest = ITEM_ID_REGEX.replace(&rest, "/$1/series/{id}.json");
    let rest = CATALOG_EXTRA_REGEX.replace(&rest, "/catalog/series/$1/{extra}");
    format!("{}{}", prefix, rest)
}
