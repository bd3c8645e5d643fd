//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing of the addon routes
//! without TorBox or the One Pace API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pacebox_core::{
    testing::{ManualClock, MockDebridClient, MockEpisodeSource},
    Config, ResolutionCache, StreamResolver,
};

/// Re-export fixtures for test convenience
pub use pacebox_core::testing::fixtures;

pub const MAGNET: &str = "magnet:?xt=urn:btih:AAA";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Debrid service (MockDebridClient)
/// - Episode catalog (MockEpisodeSource)
/// - Time (ManualClock), so readiness polling never sleeps
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_streams() {
///     let fixture = TestFixture::new();
///     fixture.debrid.push_status(Ok(fixtures::ready_status(vec![])));
///
///     let response = fixture.get("/stream/series/onepace1.json?torbox_api_key=k").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock debrid client - configure submissions, statuses and links
    pub debrid: MockDebridClient,
    /// Mock catalog - configure episodes
    pub catalog: MockEpisodeSource,
    /// Simulated clock shared by the cache and the poller
    pub clock: ManualClock,
    /// Resolution cache, for direct inspection
    pub cache: Arc<ResolutionCache>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Serve `/debug/cache`
    pub expose_debug: bool,
    /// Server-side default TorBox key
    pub default_api_key: Option<String>,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    ///
    /// The catalog holds episode 1 (Romance Dawn, with a magnet) and
    /// episode 2 (Orange Town, without one).
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let debrid = MockDebridClient::new();
        let catalog = MockEpisodeSource::with_episodes(vec![
            fixtures::episode("1", "Romance Dawn", Some(MAGNET)),
            fixtures::episode("2", "Orange Town", None),
        ]);
        let clock = ManualClock::new();

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.expose_debug = test_config.expose_debug;
        config.debrid.api_key = test_config.default_api_key;

        let cache = Arc::new(ResolutionCache::new(
            config.resolver.cache_ttl(),
            Arc::new(clock.clone()),
        ));
        let resolver = StreamResolver::new(
            Arc::new(debrid.clone()),
            Arc::new(catalog.clone()),
            Arc::clone(&cache),
            Arc::new(clock.clone()),
            config.resolver.clone(),
        );

        let state = Arc::new(pacebox_server::state::AppState::new(
            config,
            resolver,
            Arc::new(catalog.clone()),
            Arc::clone(&cache),
        ));

        let router = pacebox_server::api::create_router(state);

        Self {
            router,
            debrid,
            catalog,
            clock,
            cache,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a request to the test server.
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Host", "addon.test")
            .header("Origin", "https://app.strem.io")
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}
