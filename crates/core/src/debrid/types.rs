//! Types for debrid service operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the debrid service (transport, HTTP or payload).
#[derive(Debug, Clone, Error)]
pub enum DebridError {
    #[error("Debrid API error: {status} {message}")]
    Http { status: u16, message: String },

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Request timeout")]
    Timeout,
}

impl DebridError {
    /// Upstream HTTP status, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            DebridError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DebridError::Http { .. } => "http",
            DebridError::Transport(_) => "transport",
            DebridError::Malformed(_) => "malformed",
            DebridError::Rejected(_) => "rejected",
            DebridError::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for DebridError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DebridError::Timeout
        } else if e.is_decode() {
            DebridError::Malformed(e.to_string())
        } else {
            DebridError::Transport(e.to_string())
        }
    }
}

/// Debrid-side torrent identifier.
pub type TorrentHandle = u64;

/// Result of submitting a magnet link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub torrent_id: TorrentHandle,
}

/// Download state reported by the debrid service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    /// Waiting for metadata or a free slot.
    Queued,
    /// Fetching from peers.
    Downloading,
    /// Fully downloaded to the debrid service.
    Downloaded,
    /// Already present in the service's shared cache.
    Cached,
    /// The service gave up on the torrent.
    Error,
    /// Not reported, or not recognised.
    Unknown,
}

impl DownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Queued => "queued",
            DownloadState::Downloading => "downloading",
            DownloadState::Downloaded => "downloaded",
            DownloadState::Cached => "cached",
            DownloadState::Error => "error",
            DownloadState::Unknown => "unknown",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DownloadState::Downloaded | DownloadState::Cached)
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file inside a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    pub id: u64,
    pub name: String,
    pub size_bytes: u64,
}

impl TorrentFile {
    pub fn new(id: u64, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id,
            name: name.into(),
            size_bytes,
        }
    }
}

/// Status snapshot of a torrent on the debrid service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentStatus {
    pub state: DownloadState,
    /// Download progress (0 - 100).
    pub progress: f64,
    /// Explicit completion flag, independent of `state`.
    pub finished: bool,
    pub files: Vec<TorrentFile>,
}

impl TorrentStatus {
    /// Status for a handle the service has no entry for.
    pub fn unknown() -> Self {
        Self {
            state: DownloadState::Unknown,
            progress: 0.0,
            finished: false,
            files: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.finished || self.state.is_ready()
    }
}

/// A direct HTTP link to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectLink {
    pub url: String,
}

/// Trait for debrid service backends.
///
/// Every operation takes the caller's API key; the client itself holds no
/// credential.
#[async_trait]
pub trait DebridClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Submit a magnet link for download.
    async fn submit_magnet(
        &self,
        magnet: &str,
        api_key: &str,
    ) -> Result<SubmissionResult, DebridError>;

    /// Get the current status of a submitted torrent.
    async fn get_status(
        &self,
        torrent_id: TorrentHandle,
        api_key: &str,
    ) -> Result<TorrentStatus, DebridError>;

    /// Request a direct download link for one file of a torrent.
    async fn get_direct_link(
        &self,
        torrent_id: TorrentHandle,
        file_id: u64,
        api_key: &str,
    ) -> Result<DirectLink, DebridError>;
}
