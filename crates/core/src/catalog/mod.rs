//! Episode catalog.
//!
//! The catalog is the external source of episode listings and their magnet
//! links. The primary source is the One Pace GraphQL API; a built-in list of
//! early episodes stands in when it is unreachable.

mod onepace;
mod types;

pub use onepace::OnePaceClient;
pub use types::*;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when fetching the episode list.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Trait for episode listing backends.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch every known episode. May be empty.
    async fn list_episodes(&self) -> Result<Vec<Episode>, CatalogError>;
}

/// Static list of the first arcs, without torrents.
pub struct FallbackEpisodeSource;

#[async_trait]
impl EpisodeSource for FallbackEpisodeSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, CatalogError> {
        Ok(fallback_episodes())
    }
}

/// The built-in episode list.
pub fn fallback_episodes() -> Vec<Episode> {
    [
        ("1", "Romance Dawn", "1-7", (2014, 3, 16)),
        ("2", "Orange Town", "8-21", (2014, 3, 20)),
        ("3", "Syrup Village", "22-41", (2014, 4, 1)),
        ("4", "Baratie", "42-68", (2014, 4, 15)),
        ("5", "Arlong Park", "69-95", (2014, 5, 1)),
    ]
    .into_iter()
    .map(|(id, arc, manga, (y, m, d))| Episode {
        id: id.to_string(),
        title: format!("{} 01", arc),
        arc_title: arc.to_string(),
        part: 1,
        manga_chapters: Some(manga.to_string()),
        released: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single(),
        magnet: None,
    })
    .collect()
}

/// Primary source with an optional fallback used when the primary fails or
/// returns nothing.
pub struct CatalogWithFallback {
    primary: Box<dyn EpisodeSource>,
    fallback: Option<Box<dyn EpisodeSource>>,
}

impl CatalogWithFallback {
    pub fn new(primary: Box<dyn EpisodeSource>, fallback: Option<Box<dyn EpisodeSource>>) -> Self {
        Self { primary, fallback }
    }

    /// Primary source backed by the built-in list.
    pub fn with_builtin_fallback(primary: Box<dyn EpisodeSource>) -> Self {
        Self::new(primary, Some(Box::new(FallbackEpisodeSource)))
    }
}

#[async_trait]
impl EpisodeSource for CatalogWithFallback {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, CatalogError> {
        let primary = self.primary.list_episodes().await;

        let fallback = match &self.fallback {
            Some(fallback) => fallback,
            None => return primary,
        };

        match primary {
            Ok(episodes) if !episodes.is_empty() => Ok(episodes),
            Ok(_) => {
                info!(
                    "{} returned no episodes, using {} data",
                    self.primary.name(),
                    fallback.name()
                );
                fallback.list_episodes().await
            }
            Err(e) => {
                warn!(
                    "{} not available, using {} data: {}",
                    self.primary.name(),
                    fallback.name(),
                    e
                );
                fallback.list_episodes().await
            }
        }
    }
}
