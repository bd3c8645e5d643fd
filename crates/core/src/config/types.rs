use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub debrid: DebridConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Serve `/debug/cache` (disable in production).
    #[serde(default)]
    pub expose_debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_debug: false,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

/// TorBox debrid service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebridConfig {
    /// API base URL (e.g., "https://api.torbox.app/v1/api")
    #[serde(default = "default_debrid_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_debrid_timeout")]
    pub timeout_secs: u32,
    /// Fallback API key used when a request carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for DebridConfig {
    fn default() -> Self {
        Self {
            base_url: default_debrid_url(),
            timeout_secs: default_debrid_timeout(),
            api_key: None,
        }
    }
}

fn default_debrid_url() -> String {
    "https://api.torbox.app/v1/api".to_string()
}

fn default_debrid_timeout() -> u32 {
    30
}

/// Stream resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// How often to poll torrent status while waiting (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long to wait for a torrent to become ready (milliseconds).
    /// On expiry the last observed status is used.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_ms: u64,
    /// Maximum number of video files to request direct links for.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// How long a submitted magnet is remembered (seconds).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// API key value treated as "not configured".
    #[serde(default = "default_placeholder_key")]
    pub placeholder_key: String,
}

impl ResolverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            ready_timeout_ms: default_ready_timeout(),
            max_candidates: default_max_candidates(),
            cache_ttl_secs: default_cache_ttl(),
            placeholder_key: default_placeholder_key(),
        }
    }
}

fn default_poll_interval() -> u64 {
    3000 // 3 seconds
}

fn default_ready_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_max_candidates() -> usize {
    3
}

fn default_cache_ttl() -> u64 {
    30 * 60 // 30 minutes
}

fn default_placeholder_key() -> String {
    "test".to_string()
}

/// Episode catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// One Pace GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u32,
    /// Serve the built-in episode list when the API is unavailable.
    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            timeout_secs: default_catalog_timeout(),
            fallback: true,
        }
    }
}

fn default_graphql_url() -> String {
    "https://onepace.net/api/graphql".to_string()
}

fn default_catalog_timeout() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub debrid: SanitizedDebridConfig,
    pub resolver: ResolverConfig,
    pub catalog: CatalogConfig,
}

/// Sanitized debrid config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDebridConfig {
    pub base_url: String,
    pub timeout_secs: u32,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            debrid: SanitizedDebridConfig {
                base_url: config.debrid.base_url.clone(),
                timeout_secs: config.debrid.timeout_secs,
                api_key_configured: config
                    .debrid
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            resolver: config.resolver.clone(),
            catalog: config.catalog.clone(),
        }
    }
}
