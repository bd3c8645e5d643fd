use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::{addon, handlers, middleware::metrics_middleware};
use crate::state::AppState;

/// Addon protocol routes; mounted at the root and under `/{config}`.
fn addon_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/manifest.json", get(addon::get_manifest))
        .route(
            "/catalog/series/onepace-torbox.json",
            get(addon::get_catalog),
        )
        .route(
            "/catalog/series/onepace-torbox/{extra}",
            get(addon::get_catalog_with_extra),
        )
        .route("/meta/series/{id}", get(addon::get_meta))
        .route("/stream/series/{id}", get(addon::get_streams))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Service
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        .route("/debug/cache", get(handlers::debug_cache))
        // Addon
        .merge(addon_routes())
        .nest("/{config}", addon_routes())
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("max-age=3600"),
        ))
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
