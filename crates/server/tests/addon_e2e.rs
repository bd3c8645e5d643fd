//! E2E tests for the addon HTTP surface using mock dependencies.

mod common;

use axum::http::StatusCode;
use pacebox_core::{DebridError, DirectLink, SubmissionResult};

use common::{fixtures, TestConfig, TestFixture, MAGNET};

const GIB: u64 = 1024 * 1024 * 1024;

// =============================================================================
// Manifest and catalog
// =============================================================================

#[tokio::test]
async fn test_manifest() {
    let fixture = TestFixture::new();

    let response = fixture.get("/manifest.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "com.onepace.torbox");
    assert_eq!(response.body["resources"][1], "stream");
    assert_eq!(response.body["idPrefixes"][0], "onepace");
}

#[tokio::test]
async fn test_manifest_under_config_prefix() {
    let fixture = TestFixture::new();

    let response = fixture.get("/torbox_api_key=abc/manifest.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "com.onepace.torbox");
}

#[tokio::test]
async fn test_catalog_lists_released_episodes() {
    let fixture = TestFixture::new();
    let mut unreleased = fixtures::episode("3", "Syrup Village", None);
    unreleased.released = None;
    fixture.catalog.set_episodes(vec![
        fixtures::episode("1", "Romance Dawn", Some(MAGNET)),
        fixtures::episode("2", "Orange Town", None),
        unreleased,
    ]);

    let response = fixture.get("/catalog/series/onepace-torbox.json").await;

    assert_eq!(response.status, StatusCode::OK);
    let metas = response.body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 2);
    assert_eq!(metas[0]["id"], "onepace1");
    assert_eq!(metas[0]["name"], "One Pace: Romance Dawn");
    assert_eq!(metas[1]["videos"][0]["id"], "onepace2:1:1");
}

#[tokio::test]
async fn test_catalog_search_and_skip() {
    let fixture = TestFixture::new();

    let response = fixture
        .get("/catalog/series/onepace-torbox.json?search=orange")
        .await;
    let metas = response.body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["id"], "onepace2");

    let response = fixture
        .get("/catalog/series/onepace-torbox.json?skip=1")
        .await;
    let metas = response.body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["id"], "onepace2");
}

#[tokio::test]
async fn test_catalog_extras_in_path() {
    let fixture = TestFixture::new();

    let response = fixture
        .get("/catalog/series/onepace-torbox/search=orange.json")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let metas = response.body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["id"], "onepace2");

    let response = fixture
        .get("/torbox_api_key=abc/catalog/series/onepace-torbox/skip=1.json")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let metas = response.body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["id"], "onepace2");

    let response = fixture
        .get("/catalog/series/onepace-torbox/search=dawn&skip=1.json")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["metas"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_failure_is_500() {
    let fixture = TestFixture::new();
    fixture.catalog.set_error("down");

    let response = fixture.get("/catalog/series/onepace-torbox.json").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Failed to fetch catalog");
}

#[tokio::test]
async fn test_meta_found_and_missing() {
    let fixture = TestFixture::new();

    let response = fixture.get("/meta/series/onepace1.json").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["meta"]["id"], "onepace1");
    assert_eq!(response.body["meta"]["releaseInfo"], "2014");

    let response = fixture.get("/meta/series/onepace99.json").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Episode not found");
}

// =============================================================================
// Streams
// =============================================================================

#[tokio::test]
async fn test_stream_without_key_is_setup_placeholder() {
    let fixture = TestFixture::new();

    let response = fixture.get("/stream/series/onepace1:1:1.json").await;

    assert_eq!(response.status, StatusCode::OK);
    let streams = response.body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["name"], "TorBox Setup Required");
    assert_eq!(streams[0]["url"], "");
    assert_eq!(streams[0]["behaviorHints"]["notWebReady"], true);
    assert_eq!(fixture.debrid.total_calls(), 0);
}

#[tokio::test]
async fn test_stream_resolves_to_direct_link() {
    let fixture = TestFixture::new();
    fixture.debrid.set_submit_result(Ok(SubmissionResult {
        success: true,
        torrent_id: 42,
    }));
    fixture.debrid.push_status(Ok(fixtures::ready_status(vec![
        fixtures::video_file(1, "ep.mkv", 2 * GIB),
    ])));
    fixture.debrid.set_link_result(
        1,
        Ok(DirectLink {
            url: "https://cdn/x".to_string(),
        }),
    );

    let response = fixture
        .get("/stream/series/onepace1:1:1.json?torbox_api_key=secret")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let streams = response.body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["name"], "TorBox - Romance Dawn");
    assert_eq!(streams[0]["url"], "https://cdn/x");
    assert_eq!(streams[0]["behaviorHints"]["notWebReady"], false);
    assert_eq!(streams[0]["behaviorHints"]["bingeGroup"], "onepace-1");
    let title = streams[0]["title"].as_str().unwrap();
    assert!(title.contains("2.00 GB"));
    assert!(title.contains("Quality: Unknown"));
}

#[tokio::test]
async fn test_stream_key_from_config_segment_wins() {
    let fixture = TestFixture::new();
    fixture
        .debrid
        .push_status(Ok(fixtures::ready_status(vec![fixtures::video_file(
            1, "ep.mkv", GIB,
        )])));

    let response = fixture
        .get("/torbox_api_key=from-path/stream/series/onepace1.json?api_key=from-query")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(fixture.debrid.submit_calls(), 1);
    match &fixture.debrid.calls()[0] {
        pacebox_core::testing::RecordedDebridCall::Submit { api_key, .. } => {
            assert_eq!(api_key, "from-path")
        }
        other => panic!("Expected submit call, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_uses_server_default_key() {
    let fixture = TestFixture::with_config(TestConfig {
        default_api_key: Some("server-key".to_string()),
        ..Default::default()
    });
    fixture
        .debrid
        .push_status(Ok(fixtures::ready_status(vec![fixtures::video_file(
            1, "ep.mkv", GIB,
        )])));

    let response = fixture.get("/stream/series/onepace1.json").await;

    let streams = response.body["streams"].as_array().unwrap();
    assert_eq!(streams[0]["url"], "https://mock.debrid/1/1");
    assert_eq!(fixture.debrid.submit_calls(), 1);
}

#[tokio::test]
async fn test_stream_sentinel_key_makes_no_calls() {
    let fixture = TestFixture::new();

    let response = fixture
        .get("/stream/series/onepace1.json?torbox_api_key=test")
        .await;

    assert_eq!(
        response.body["streams"][0]["name"],
        "TorBox Setup Required"
    );
    assert_eq!(fixture.debrid.total_calls(), 0);
}

#[tokio::test]
async fn test_stream_unknown_and_torrentless_episodes() {
    let fixture = TestFixture::new();

    let response = fixture
        .get("/stream/series/onepace99.json?torbox_api_key=k")
        .await;
    assert_eq!(response.body["streams"][0]["name"], "Episode Not Found");

    let response = fixture
        .get("/stream/series/onepace2.json?torbox_api_key=k")
        .await;
    assert_eq!(response.body["streams"][0]["name"], "No Torrent Available");

    assert_eq!(fixture.debrid.total_calls(), 0);
}

#[tokio::test]
async fn test_stream_debrid_error_placeholder() {
    let fixture = TestFixture::new();
    fixture.debrid.set_submit_result(Err(DebridError::Http {
        status: 401,
        message: "Unauthorized".to_string(),
    }));

    let response = fixture
        .get("/stream/series/onepace1.json?torbox_api_key=bad")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["streams"][0]["name"], "TorBox Error");
    assert_eq!(response.body["streams"][0]["url"], "");
}

#[tokio::test]
async fn test_stream_submission_cached_between_requests() {
    let fixture = TestFixture::new();
    fixture
        .debrid
        .push_status(Ok(fixtures::ready_status(vec![fixtures::video_file(
            1, "ep.mkv", GIB,
        )])));

    fixture
        .get("/stream/series/onepace1.json?torbox_api_key=k")
        .await;
    fixture
        .get("/stream/series/onepace1.json?torbox_api_key=k")
        .await;
    assert_eq!(fixture.debrid.submit_calls(), 1);

    fixture.clock.advance(fixture.cache.ttl());
    fixture
        .get("/stream/series/onepace1.json?torbox_api_key=k")
        .await;
    assert_eq!(fixture.debrid.submit_calls(), 2);
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_info() {
    let fixture = TestFixture::new();

    let response = fixture.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "online");
    assert_eq!(response.body["manifest"], "http://addon.test/manifest.json");
    assert_eq!(response.body["endpoints"]["stream"], "/stream/series/{id}.json");
}

#[tokio::test]
async fn test_health_reports_cache_size() {
    let fixture = TestFixture::new();
    fixture.cache.put(MAGNET, SubmissionResult {
        success: true,
        torrent_id: 1,
    });

    let response = fixture.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["cache_size"], 1);
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::with_config(TestConfig {
        default_api_key: Some("server-secret".to_string()),
        ..Default::default()
    });

    let response = fixture.get("/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["debrid"]["api_key_configured"], true);
    assert!(!response.text.contains("server-secret"));
    assert_eq!(response.body["resolver"]["max_candidates"], 3);
}

#[tokio::test]
async fn test_debug_cache_hidden_by_default() {
    let fixture = TestFixture::new();

    let response = fixture.get("/debug/cache").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_debug_cache_when_exposed() {
    let fixture = TestFixture::with_config(TestConfig {
        expose_debug: true,
        ..Default::default()
    });
    fixture.cache.put(MAGNET, SubmissionResult {
        success: true,
        torrent_id: 7,
    });

    let response = fixture.get("/debug/cache").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cache_size"], 1);
    assert_eq!(response.body["cache_entries"][0], MAGNET);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/health").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("pacebox_http_requests_total"));
    assert!(response.text.contains("pacebox_cache_entries"));
}

#[tokio::test]
async fn test_metrics_never_expose_config_segment() {
    let fixture = TestFixture::new();
    fixture.get("/torbox_api_key=UNSEEN-KEY-1").await;
    fixture.get("/torbox_api_key=UNSEEN-KEY-2/nowhere").await;
    fixture
        .get("/torbox_api_key=UNSEEN-KEY-3/stream/series/onepace2.json")
        .await;

    let response = fixture.get("/metrics").await;

    assert!(!response.text.contains("UNSEEN-KEY"));
    assert!(response.text.contains("path=\"unmatched\""));
}

#[tokio::test]
async fn test_cors_and_cache_headers() {
    let fixture = TestFixture::new();

    let response = fixture.get("/manifest.json").await;

    assert_eq!(response.headers["access-control-allow-origin"], "*");
    assert_eq!(response.headers["cache-control"], "max-age=3600");
}
