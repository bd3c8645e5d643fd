use std::sync::Arc;

use pacebox_core::{Config, EpisodeSource, ResolutionCache, SanitizedConfig, StreamResolver};

/// Shared application state
pub struct AppState {
    config: Config,
    resolver: StreamResolver,
    catalog: Arc<dyn EpisodeSource>,
    cache: Arc<ResolutionCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: StreamResolver,
        catalog: Arc<dyn EpisodeSource>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self {
            config,
            resolver,
            catalog,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn resolver(&self) -> &StreamResolver {
        &self.resolver
    }

    pub fn catalog(&self) -> &dyn EpisodeSource {
        self.catalog.as_ref()
    }

    pub fn cache(&self) -> &ResolutionCache {
        self.cache.as_ref()
    }
}
