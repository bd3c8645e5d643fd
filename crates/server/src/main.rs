use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pacebox_core::{
    config_path, load_config, validate_config, CatalogWithFallback, Clock, DebridClient,
    EpisodeSource, OnePaceClient, ResolutionCache, StreamResolver, TokioClock, TorBoxClient,
    CONFIG_PATH_ENV,
};
use pacebox_server::api::create_router;
use pacebox_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = config_path(std::env::var(CONFIG_PATH_ENV).ok());

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Debrid API: {}", config.debrid.base_url);
    info!("Catalog API: {}", config.catalog.graphql_url);
    if config.debrid.api_key.is_none() {
        info!("No default TorBox API key; clients must supply their own");
    }
    if config.server.expose_debug {
        warn!("Debug endpoints are exposed");
    }

    // Create debrid client
    let debrid: Arc<dyn DebridClient> = Arc::new(
        TorBoxClient::new(&config.debrid).context("Failed to create TorBox client")?,
    );
    info!("Using debrid service: {}", debrid.name());

    // Create episode catalog
    let onepace =
        OnePaceClient::new(&config.catalog).context("Failed to create One Pace client")?;
    let catalog: Arc<dyn EpisodeSource> = if config.catalog.fallback {
        info!("Episode catalog: One Pace with built-in fallback");
        Arc::new(CatalogWithFallback::with_builtin_fallback(Box::new(onepace)))
    } else {
        info!("Episode catalog: One Pace");
        Arc::new(onepace)
    };

    // Resolution cache and resolver
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);
    let cache = Arc::new(ResolutionCache::new(
        config.resolver.cache_ttl(),
        Arc::clone(&clock),
    ));
    info!(
        "Resolution cache TTL: {}s",
        config.resolver.cache_ttl().as_secs()
    );

    let resolver = StreamResolver::new(
        debrid,
        Arc::clone(&catalog),
        Arc::clone(&cache),
        clock,
        config.resolver.clone(),
    );

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, resolver, catalog, cache));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    info!("Manifest URL: http://{}/manifest.json", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
