//! Stream descriptors and resolution failures.

use serde::ser::{Serialize, Serializer};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::debrid::{DebridError, DownloadState};

/// One entry in a stream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamDescriptor {
    /// A direct link the player can open.
    Playable {
        label: String,
        title: String,
        url: String,
        /// Groups consecutive episodes for binge watching.
        group_key: String,
    },
    /// A non-playable entry explaining why no link is available.
    Placeholder { label: String, title: String },
}

impl StreamDescriptor {
    pub fn placeholder(label: impl Into<String>, title: impl Into<String>) -> Self {
        StreamDescriptor::Placeholder {
            label: label.into(),
            title: title.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, StreamDescriptor::Placeholder { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            StreamDescriptor::Playable { label, .. } | StreamDescriptor::Placeholder { label, .. } => {
                label
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            StreamDescriptor::Playable { title, .. } | StreamDescriptor::Placeholder { title, .. } => {
                title
            }
        }
    }

    /// The link, or `None` for placeholders.
    pub fn url(&self) -> Option<&str> {
        match self {
            StreamDescriptor::Playable { url, .. } => Some(url.as_str()),
            StreamDescriptor::Placeholder { .. } => None,
        }
    }

    /// "Still processing" entry reporting the last known torrent state.
    pub fn processing(arc_title: &str, state: DownloadState, progress: f64) -> Self {
        Self::placeholder(
            format!("TorBox - {}", arc_title),
            format!(
                "⏳ Processing torrent...\n📊 Status: {}\n📈 Progress: {:.0}%\n\nTry again in a few minutes",
                state, progress
            ),
        )
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBehaviorHints<'a> {
    not_web_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    binge_group: Option<&'a str>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WireStream<'a> {
    name: &'a str,
    title: &'a str,
    url: &'a str,
    behavior_hints: WireBehaviorHints<'a>,
}

/// Serializes to the addon wire form. Placeholders get an empty url and are
/// flagged as not web-ready.
impl Serialize for StreamDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            StreamDescriptor::Playable {
                label,
                title,
                url,
                group_key,
            } => WireStream {
                name: label,
                title,
                url,
                behavior_hints: WireBehaviorHints {
                    not_web_ready: false,
                    binge_group: Some(group_key.as_str()),
                },
            },
            StreamDescriptor::Placeholder { label, title } => WireStream {
                name: label,
                title,
                url: "",
                behavior_hints: WireBehaviorHints {
                    not_web_ready: true,
                    binge_group: None,
                },
            },
        };
        wire.serialize(serializer)
    }
}

/// Why a resolution could not produce a playable link.
///
/// Never leaves the resolver: each variant becomes exactly one placeholder.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No debrid API key supplied")]
    MissingCredential,

    #[error("Episode {0} not found in catalog")]
    EpisodeNotFound(String),

    #[error("No torrent available for {0}")]
    NoTorrent(String),

    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Upstream(#[from] DebridError),

    /// The torrent never reported a status before the deadline.
    #[error("Torrent for {arc_title} not ready")]
    NotReady { arc_title: String },
}

impl ResolveError {
    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolveError::MissingCredential => "no_api_key",
            ResolveError::EpisodeNotFound(_) => "not_found",
            ResolveError::NoTorrent(_) => "no_torrent",
            ResolveError::Catalog(_) => "catalog_error",
            ResolveError::Upstream(_) => "debrid_error",
            ResolveError::NotReady { .. } => "processing",
        }
    }
}

impl From<&ResolveError> for StreamDescriptor {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::MissingCredential => StreamDescriptor::placeholder(
                "TorBox Setup Required",
                "⚠️ Please add your TorBox API key to the addon URL\n\nGet your API key from torbox.app → Settings → API",
            ),
            ResolveError::EpisodeNotFound(id) => StreamDescriptor::placeholder(
                "Episode Not Found",
                format!("❌ Episode {} not found in catalog", id),
            ),
            ResolveError::NoTorrent(name) => StreamDescriptor::placeholder(
                "No Torrent Available",
                format!(
                    "⚠️ No torrent available for {}\n\nThe episode may not be released yet, or the catalog is serving fallback data",
                    name
                ),
            ),
            ResolveError::Catalog(e) => StreamDescriptor::placeholder(
                "Catalog Unavailable",
                format!("❌ Could not load the episode catalog: {}", e),
            ),
            ResolveError::Upstream(e) => StreamDescriptor::placeholder(
                "TorBox Error",
                format!(
                    "❌ TorBox Error: {}\n\nPlease check:\n• Your API key is valid\n• Your TorBox account is active\n• The torrent is accessible",
                    e
                ),
            ),
            ResolveError::NotReady { arc_title } => {
                StreamDescriptor::processing(arc_title, DownloadState::Unknown, 0.0)
            }
        }
    }
}
