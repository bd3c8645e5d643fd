pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod debrid;
pub mod metrics;
pub mod poller;
pub mod resolver;
pub mod selector;
pub mod testing;

pub use cache::{ResolutionCache, DEFAULT_CACHE_TTL};
pub use catalog::{
    fallback_episodes, find_episode, CatalogError, CatalogWithFallback, Episode, EpisodeSource,
    FallbackEpisodeSource, OnePaceClient,
};
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{
    config_path, load_config, load_config_from_str, validate_config, CatalogConfig, Config,
    ConfigError, DebridConfig, ResolverConfig, SanitizedConfig, ServerConfig, CONFIG_PATH_ENV,
    DEFAULT_CONFIG_PATH,
};
pub use debrid::{
    DebridClient, DebridError, DirectLink, DownloadState, SubmissionResult, TorBoxClient,
    TorrentFile, TorrentHandle, TorrentStatus,
};
pub use poller::{PollReport, PollState, PollerConfig, ReadinessPoller};
pub use resolver::{ResolveError, StreamDescriptor, StreamResolver};
pub use selector::{format_size_gb, is_video_file, select_candidates, Quality};
