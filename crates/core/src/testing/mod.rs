//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits
//! (debrid service, episode catalog) plus a simulated clock, allowing the
//! whole resolution flow to be exercised without network access or real
//! sleeps.
//!
//! # Example
//!
//! ```rust,ignore
//! use pacebox_core::testing::{fixtures, ManualClock, MockDebridClient, MockEpisodeSource};
//!
//! let debrid = MockDebridClient::new();
//! let catalog = MockEpisodeSource::with_episodes(vec![
//!     fixtures::episode("1", "Romance Dawn", Some("magnet:?xt=urn:btih:AAA")),
//! ]);
//! let clock = ManualClock::new();
//! ```

mod mock_debrid;
mod mock_episode_source;

pub use crate::clock::ManualClock;
pub use mock_debrid::{MockDebridClient, RecordedDebridCall};
pub use mock_episode_source::MockEpisodeSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::catalog::Episode;
    use crate::debrid::{DownloadState, TorrentFile, TorrentStatus};

    /// Create an episode of part 1 released in 2014.
    pub fn episode(id: &str, arc: &str, magnet: Option<&str>) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("{} 01", arc),
            arc_title: arc.to_string(),
            part: 1,
            manga_chapters: None,
            released: Utc.with_ymd_and_hms(2014, 3, 16, 0, 0, 0).single(),
            magnet: magnet.map(str::to_string),
        }
    }

    pub fn video_file(id: u64, name: &str, size_bytes: u64) -> TorrentFile {
        TorrentFile::new(id, name, size_bytes)
    }

    /// A downloaded torrent listing the given files.
    pub fn ready_status(files: Vec<TorrentFile>) -> TorrentStatus {
        TorrentStatus {
            state: DownloadState::Downloaded,
            progress: 100.0,
            finished: true,
            files,
        }
    }

    /// A torrent still downloading.
    pub fn downloading_status(progress: f64, files: Vec<TorrentFile>) -> TorrentStatus {
        TorrentStatus {
            state: DownloadState::Downloading,
            progress,
            finished: false,
            files,
        }
    }
}
