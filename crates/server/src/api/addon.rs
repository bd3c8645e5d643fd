//! Stremio addon protocol handlers.
//!
//! Every route is served both at the root and under a `/{config}/` prefix. The
//! config segment is how addon clients carry per-user settings, here the
//! TorBox API key (`torbox_api_key=<key>`).

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use pacebox_core::{find_episode, Episode, StreamDescriptor};

use crate::state::AppState;

/// Catalog id advertised in the manifest.
pub const CATALOG_ID: &str = "onepace-torbox";

/// Prefix of every item id this addon serves.
pub const ID_PREFIX: &str = "onepace";

const LOGO_URL: &str = "https://onepace.net/images/logo.png";
const POSTER_URL: &str = "https://images.justwatch.com/poster/244890632/s718/one-piece.jpg";
const BACKGROUND_URL: &str = "https://images.justwatch.com/backdrop/177834441/s1920/one-piece.jpg";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub logo: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub catalogs: Vec<ManifestCatalog>,
    pub id_prefixes: Vec<&'static str>,
    pub behavior_hints: ManifestBehaviorHints,
}

#[derive(Debug, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub extra: Vec<ManifestExtra>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    pub name: &'static str,
    pub is_required: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBehaviorHints {
    pub adult: bool,
    pub p2p: bool,
    pub configurable: bool,
    pub configuration_required: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub poster: &'static str,
    pub background: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
    pub genres: Vec<&'static str>,
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub season: u32,
    pub episode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    pub thumbnail: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<Meta>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQueryParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub skip: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQueryParams {
    #[serde(default)]
    pub torbox_api_key: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

pub fn manifest() -> Manifest {
    Manifest {
        id: "com.onepace.torbox",
        version: env!("CARGO_PKG_VERSION"),
        name: "One Pace (TorBox)",
        description: "One Pace episodes streamed through TorBox debrid service",
        logo: LOGO_URL,
        resources: vec!["catalog", "stream", "meta"],
        types: vec!["series"],
        catalogs: vec![ManifestCatalog {
            kind: "series",
            id: CATALOG_ID,
            name: "One Pace",
            extra: vec![
                ManifestExtra {
                    name: "search",
                    is_required: false,
                },
                ManifestExtra {
                    name: "skip",
                    is_required: false,
                },
            ],
        }],
        id_prefixes: vec![ID_PREFIX],
        behavior_hints: ManifestBehaviorHints {
            adult: false,
            p2p: false,
            configurable: true,
            configuration_required: false,
        },
    }
}

/// Strip the addon prefix, any `:season:episode` suffix and a `.json`
/// extension: `onepace12:1:1.json` -> `12`.
pub fn extract_episode_id(raw: &str) -> &str {
    let id = raw.strip_suffix(".json").unwrap_or(raw);
    match id.strip_prefix(ID_PREFIX) {
        Some(rest) => rest.split(':').next().unwrap_or(rest),
        None => id,
    }
}

/// Pull `torbox_api_key=<key>` out of a config path segment.
pub fn api_key_from_config(config: &str) -> Option<String> {
    config
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "torbox_api_key")
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .filter(|key| !key.is_empty())
}

/// Resolve the caller's API key: config segment, then query, then server config.
fn resolve_api_key(
    state: &AppState,
    config_segment: Option<&str>,
    query: &StreamQueryParams,
) -> Option<String> {
    config_segment
        .and_then(api_key_from_config)
        .or_else(|| non_empty(&query.torbox_api_key))
        .or_else(|| non_empty(&query.api_key))
        .or_else(|| non_empty(&state.config().debrid.api_key))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn to_meta(episode: &Episode) -> Meta {
    let mut description = episode.display_title();
    if let Some(manga) = &episode.manga_chapters {
        description.push_str(&format!("\nManga chapters: {}", manga));
    }

    Meta {
        id: format!("{}{}", ID_PREFIX, episode.id),
        kind: "series",
        name: format!("One Pace: {}", episode.arc_title),
        poster: POSTER_URL,
        background: BACKGROUND_URL,
        description,
        release_info: episode.year().map(|y| y.to_string()),
        genres: vec!["Animation", "Adventure", "Comedy"],
        videos: vec![Video {
            id: format!("{}{}:1:1", ID_PREFIX, episode.id),
            title: episode.display_title(),
            overview: episode
                .manga_chapters
                .as_ref()
                .map(|m| format!("Manga chapters: {}", m)),
            season: 1,
            episode: 1,
            released: episode.released.map(|d| d.to_rfc3339()),
            thumbnail: POSTER_URL,
        }],
    }
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /manifest.json
pub async fn get_manifest() -> Json<Manifest> {
    Json(manifest())
}

/// Parse catalog extras from a path segment: `search=orange&skip=10.json`.
///
/// Unknown names and unparsable `skip` values are ignored.
pub fn parse_catalog_extra(segment: &str) -> CatalogQueryParams {
    let segment = segment.strip_suffix(".json").unwrap_or(segment);
    let mut params = CatalogQueryParams::default();
    for (name, value) in segment.split('&').filter_map(|pair| pair.split_once('=')) {
        match name {
            "search" => params.search = Some(value.to_string()),
            "skip" => params.skip = value.parse().ok(),
            _ => {}
        }
    }
    params
}

/// GET /catalog/series/onepace-torbox.json
///
/// Released episodes, optionally filtered by `search` and offset by `skip`.
pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<CatalogResponse>, impl IntoResponse> {
    catalog_response(&state, params).await
}

/// GET /catalog/series/onepace-torbox/{extra}.json
///
/// Same listing with the extras carried in the path, as addon clients send
/// them. Query parameters fill in whatever the segment leaves out.
pub async fn get_catalog_with_extra(
    State(state): State<Arc<AppState>>,
    Path(path): Path<HashMap<String, String>>,
    Query(query): Query<CatalogQueryParams>,
) -> Result<Json<CatalogResponse>, impl IntoResponse> {
    let extra = parse_catalog_extra(path.get("extra").map(String::as_str).unwrap_or_default());
    let params = CatalogQueryParams {
        search: extra.search.or(query.search),
        skip: extra.skip.or(query.skip),
    };
    catalog_response(&state, params).await
}

async fn catalog_response(
    state: &AppState,
    params: CatalogQueryParams,
) -> Result<Json<CatalogResponse>, (StatusCode, Json<ErrorResponse>)> {
    let episodes = match state.catalog().list_episodes().await {
        Ok(episodes) => episodes,
        Err(e) => {
            error!("Error in catalog route: {}", e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch catalog",
            ));
        }
    };

    let search = params.search.as_deref().map(str::trim).unwrap_or_default();
    let metas = episodes
        .iter()
        .filter(|e| e.released.is_some())
        .filter(|e| search.is_empty() || e.matches(search))
        .skip(params.skip.unwrap_or(0))
        .map(to_meta)
        .collect();

    Ok(Json(CatalogResponse { metas }))
}

/// GET /meta/series/{id}.json
pub async fn get_meta(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<MetaResponse>, impl IntoResponse> {
    let raw_id = params.get("id").map(String::as_str).unwrap_or_default();
    let episode_id = extract_episode_id(raw_id);

    let episodes = match state.catalog().list_episodes().await {
        Ok(episodes) => episodes,
        Err(e) => {
            error!("Error in meta route: {}", e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch metadata",
            ));
        }
    };

    match find_episode(&episodes, episode_id) {
        Some(episode) => Ok(Json(MetaResponse {
            meta: to_meta(episode),
        })),
        None => Err(error_response(StatusCode::NOT_FOUND, "Episode not found")),
    }
}

/// GET /stream/series/{id}.json
///
/// Always 200: failures are reported as placeholder streams.
pub async fn get_streams(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<StreamQueryParams>,
) -> Json<StreamsResponse> {
    let raw_id = params.get("id").map(String::as_str).unwrap_or_default();
    let episode_id = extract_episode_id(raw_id);
    let api_key = resolve_api_key(&state, params.get("config").map(String::as_str), &query);

    let streams = state
        .resolver()
        .resolve(episode_id, api_key.as_deref())
        .await;

    Json(StreamsResponse { streams })
}
