//! Video file selection and labelling.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::debrid::TorrentFile;

/// Container extensions treated as playable video.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "m4v", "webm"];

/// Default number of files to request direct links for.
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Whether a file name ends in a known video extension (case-insensitive).
pub fn is_video_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Pick up to `max` video files, largest first.
///
/// The largest file in a torrent is assumed to be the main video. Files of
/// equal size keep their listing order.
pub fn select_candidates(files: &[TorrentFile], max: usize) -> Vec<TorrentFile> {
    let mut videos: Vec<TorrentFile> = files
        .iter()
        .filter(|f| is_video_file(&f.name))
        .cloned()
        .collect();
    videos.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    videos.truncate(max);
    videos
}

/// Coarse quality tag derived from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Fhd1080p,
    Hd720p,
    Sd480p,
    Uhd4k,
    Unknown,
}

static QUALITY_PATTERNS: Lazy<[(Regex, Quality); 4]> = Lazy::new(|| {
    [
        (Regex::new(r"(?i)1080p|1920x1080").unwrap(), Quality::Fhd1080p),
        (Regex::new(r"(?i)720p|1280x720").unwrap(), Quality::Hd720p),
        (Regex::new(r"(?i)480p|854x480").unwrap(), Quality::Sd480p),
        (Regex::new(r"(?i)4k|2160p").unwrap(), Quality::Uhd4k),
    ]
});

impl Quality {
    /// Match resolution markers in the order 1080p, 720p, 480p, 4K.
    pub fn from_filename(name: &str) -> Self {
        QUALITY_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(name))
            .map(|(_, quality)| *quality)
            .unwrap_or(Quality::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Fhd1080p => "1080p",
            Quality::Hd720p => "720p",
            Quality::Sd480p => "480p",
            Quality::Uhd4k => "4K",
            Quality::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size in binary gigabytes with two decimals, e.g. `"2.00 GB"`.
pub fn format_size_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}
