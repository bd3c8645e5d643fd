//! TorBox debrid client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DebridConfig;
use crate::metrics::DEBRID_REQUESTS;

use super::{
    DebridClient, DebridError, DirectLink, DownloadState, SubmissionResult, TorrentFile,
    TorrentHandle, TorrentStatus,
};

/// TorBox API client.
pub struct TorBoxClient {
    client: Client,
    base_url: String,
}

impl TorBoxClient {
    /// Create a new TorBox client.
    pub fn new(config: &DebridConfig) -> Result<Self, DebridError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send an authenticated request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        api_key: &str,
    ) -> Result<T, DebridError> {
        let result = self.send_inner(request, api_key).await;
        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        DEBRID_REQUESTS
            .with_label_values(&[operation, label])
            .inc();
        result
    }

    async fn send_inner<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        api_key: &str,
    ) -> Result<T, DebridError> {
        let response = request.bearer_auth(api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("TorBox API error: {} {}", status, body);
            return Err(DebridError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or(body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| DebridError::Malformed(format!("Failed to parse response: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct CreateTorrentBody<'a> {
    magnet: &'a str,
    seed: u8,
}

/// TorBox has returned the id both at the top level and nested under `data`.
#[derive(Debug, Deserialize)]
struct CreateTorrentResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    torrent_id: Option<TorrentHandle>,
    #[serde(default)]
    data: Option<CreateTorrentData>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTorrentData {
    torrent_id: Option<TorrentHandle>,
}

#[derive(Debug, Deserialize)]
struct MyListResponse {
    #[serde(default)]
    data: Option<OneOrMany<TbTorrent>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TbTorrent {
    #[serde(default)]
    download_state: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    download_finished: bool,
    #[serde(default)]
    files: Vec<TbFile>,
}

#[derive(Debug, Deserialize)]
struct TbFile {
    id: u64,
    name: String,
    #[serde(default)]
    size: u64,
}

impl TbTorrent {
    fn into_status(self) -> TorrentStatus {
        TorrentStatus {
            state: self
                .download_state
                .as_deref()
                .map(parse_download_state)
                .unwrap_or(DownloadState::Unknown),
            progress: normalize_progress(self.progress.unwrap_or(0.0)),
            finished: self.download_finished,
            files: self
                .files
                .into_iter()
                .map(|f| TorrentFile::new(f.id, f.name, f.size))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RequestDlResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Parse a TorBox `download_state` string.
fn parse_download_state(state: &str) -> DownloadState {
    let state = state.to_ascii_lowercase();
    match state.as_str() {
        "cached" => DownloadState::Cached,
        "downloaded" | "completed" | "uploading" | "seeding" => DownloadState::Downloaded,
        "downloading" | "paused" => DownloadState::Downloading,
        "queued" | "metadl" => DownloadState::Queued,
        "error" => DownloadState::Error,
        s if s.starts_with("stalled") => DownloadState::Downloading,
        s if s.starts_with("checking") || s.starts_with("queued") => DownloadState::Queued,
        s if s.starts_with("failed") => DownloadState::Error,
        _ => DownloadState::Unknown,
    }
}

/// TorBox reports progress as a 0-1 fraction; older responses used percent.
fn normalize_progress(progress: f64) -> f64 {
    let percent = if progress <= 1.0 {
        progress * 100.0
    } else {
        progress
    };
    percent.clamp(0.0, 100.0)
}

#[async_trait]
impl DebridClient for TorBoxClient {
    fn name(&self) -> &str {
        "torbox"
    }

    async fn submit_magnet(
        &self,
        magnet: &str,
        api_key: &str,
    ) -> Result<SubmissionResult, DebridError> {
        let url = self.url("/torrents/createtorrent");
        debug!("TorBox API Request: POST {}", url);

        let request = self
            .client
            .post(&url)
            .json(&CreateTorrentBody { magnet, seed: 1 });
        let response: CreateTorrentResponse =
            self.send("createtorrent", request, api_key).await?;

        let torrent_id = response
            .torrent_id
            .or_else(|| response.data.and_then(|d| d.torrent_id));

        match torrent_id {
            Some(torrent_id) => Ok(SubmissionResult {
                success: response.success,
                torrent_id,
            }),
            None if !response.success => Err(DebridError::Rejected(
                response
                    .detail
                    .unwrap_or_else(|| "Failed to add torrent".to_string()),
            )),
            None => Err(DebridError::Malformed(
                "createtorrent response has no torrent_id".to_string(),
            )),
        }
    }

    async fn get_status(
        &self,
        torrent_id: TorrentHandle,
        api_key: &str,
    ) -> Result<TorrentStatus, DebridError> {
        let url = self.url("/torrents/mylist");
        debug!("TorBox API Request: GET {}?id={}", url, torrent_id);

        let request = self
            .client
            .get(&url)
            .query(&[("id", torrent_id.to_string())]);
        let response: MyListResponse = self.send("mylist", request, api_key).await?;

        Ok(response
            .data
            .and_then(OneOrMany::into_first)
            .map(TbTorrent::into_status)
            .unwrap_or_else(TorrentStatus::unknown))
    }

    async fn get_direct_link(
        &self,
        torrent_id: TorrentHandle,
        file_id: u64,
        api_key: &str,
    ) -> Result<DirectLink, DebridError> {
        let url = self.url("/torrents/requestdl");
        debug!(
            "TorBox API Request: GET {}?torrent_id={}&file_id={}",
            url, torrent_id, file_id
        );

        let request = self.client.get(&url).query(&[
            ("torrent_id", torrent_id.to_string()),
            ("file_id", file_id.to_string()),
        ]);
        let response: RequestDlResponse = self.send("requestdl", request, api_key).await?;

        match response.data {
            Some(url) if response.success && !url.is_empty() => Ok(DirectLink { url }),
            _ => Err(DebridError::Rejected(response.detail.unwrap_or_else(|| {
                format!("No download link for file {}", file_id)
            }))),
        }
    }
}
