//! Types for the episode catalog.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// A One Pace episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Catalog identifier, compared as a string.
    pub id: String,
    /// Episode title (e.g., "Romance Dawn 01").
    pub title: String,
    /// Story arc title.
    pub arc_title: String,
    /// Part number within the arc.
    pub part: u32,
    /// Manga chapter range covered (e.g., "1-7").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manga_chapters: Option<String>,
    /// Release date; unreleased episodes have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<DateTime<Utc>>,
    /// Magnet link for the episode's torrent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet: Option<String>,
}

impl Episode {
    /// Release year, if released.
    pub fn year(&self) -> Option<i32> {
        self.released.map(|d| d.year())
    }

    /// Display name, e.g. "Romance Dawn - Part 1".
    pub fn display_title(&self) -> String {
        format!("{} - Part {}", self.arc_title, self.part)
    }

    pub fn has_torrent(&self) -> bool {
        self.magnet.as_deref().is_some_and(|m| !m.trim().is_empty())
    }

    /// Case-insensitive substring match on title and arc.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.arc_title.to_lowercase().contains(&query)
    }
}

/// Find an episode by identifier.
pub fn find_episode<'a>(episodes: &'a [Episode], id: &str) -> Option<&'a Episode> {
    episodes.iter().find(|e| e.id == id)
}
