use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use pacebox_core::SanitizedConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub manifest: String,
    pub status: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub cache_size: usize,
}

#[derive(Serialize)]
pub struct CacheDebugResponse {
    pub cache_entries: Vec<String>,
    pub cache_size: usize,
}

/// GET /
pub async fn root(headers: HeaderMap) -> Json<ServiceInfo> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");

    Json(ServiceInfo {
        name: "One Pace TorBox Addon",
        version: env!("CARGO_PKG_VERSION"),
        description: "Stremio addon for One Pace content via TorBox",
        manifest: format!("http://{}/manifest.json", host),
        status: "online",
        endpoints: BTreeMap::from([
            ("manifest", "/manifest.json"),
            ("catalog", "/catalog/series/onepace-torbox.json"),
            ("stream", "/stream/series/{id}.json"),
            ("meta", "/meta/series/{id}.json"),
        ]),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        cache_size: state.cache().len(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

/// GET /debug/cache
///
/// Only served when `server.expose_debug` is set.
pub async fn debug_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheDebugResponse>, StatusCode> {
    if !state.config().server.expose_debug {
        return Err(StatusCode::NOT_FOUND);
    }

    let cache = state.cache();
    Ok(Json(CacheDebugResponse {
        cache_entries: cache.keys(),
        cache_size: cache.len(),
    }))
}
