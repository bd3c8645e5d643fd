//! Stream resolution.
//!
//! Turns an episode identifier into a list of stream descriptors:
//!
//! 1. Check the caller's API key
//! 2. Look the episode up in the catalog
//! 3. Submit its magnet to the debrid service (or reuse a cached submission)
//! 4. Poll until the torrent is ready or the deadline passes
//! 5. Request direct links for the largest video files
//!
//! Every failure along the way becomes a single placeholder descriptor, so
//! `resolve` always returns at least one entry and never an error.

mod types;

pub use types::{ResolveError, StreamDescriptor};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ResolutionCache;
use crate::catalog::{find_episode, EpisodeSource};
use crate::clock::Clock;
use crate::config::ResolverConfig;
use crate::debrid::{DebridClient, DebridError, SubmissionResult};
use crate::metrics::RESOLUTIONS;
use crate::poller::{PollerConfig, ReadinessPoller};
use crate::selector::{format_size_gb, select_candidates, Quality};

/// Resolves episodes to playable debrid links.
pub struct StreamResolver {
    debrid: Arc<dyn DebridClient>,
    catalog: Arc<dyn EpisodeSource>,
    cache: Arc<ResolutionCache>,
    clock: Arc<dyn Clock>,
    config: ResolverConfig,
}

impl StreamResolver {
    pub fn new(
        debrid: Arc<dyn DebridClient>,
        catalog: Arc<dyn EpisodeSource>,
        cache: Arc<ResolutionCache>,
        clock: Arc<dyn Clock>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            debrid,
            catalog,
            cache,
            clock,
            config,
        }
    }

    /// Resolve an episode to stream descriptors. Never empty.
    pub async fn resolve(&self, episode_id: &str, api_key: Option<&str>) -> Vec<StreamDescriptor> {
        info!("Processing stream request for episode {}", episode_id);

        let (outcome, streams) = match self.try_resolve(episode_id, api_key).await {
            Ok(streams) => {
                let outcome = if streams.iter().any(|s| !s.is_placeholder()) {
                    "playable"
                } else {
                    "processing"
                };
                (outcome, streams)
            }
            Err(e) => {
                match &e {
                    ResolveError::Upstream(_) | ResolveError::Catalog(_) => {
                        warn!("Resolution of episode {} failed: {}", episode_id, e)
                    }
                    _ => debug!("Resolution of episode {} stopped: {}", episode_id, e),
                }
                (e.outcome(), vec![StreamDescriptor::from(&e)])
            }
        };

        RESOLUTIONS.with_label_values(&[outcome]).inc();
        info!(
            "Episode {} resolved: {} ({} streams)",
            episode_id,
            outcome,
            streams.len()
        );
        streams
    }

    async fn try_resolve(
        &self,
        episode_id: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<StreamDescriptor>, ResolveError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != self.config.placeholder_key)
            .ok_or(ResolveError::MissingCredential)?;

        let episodes = self.catalog.list_episodes().await?;
        let episode = find_episode(&episodes, episode_id)
            .ok_or_else(|| ResolveError::EpisodeNotFound(episode_id.to_string()))?;

        if !episode.has_torrent() {
            return Err(ResolveError::NoTorrent(episode.display_title()));
        }
        let magnet = episode.magnet.as_deref().unwrap_or_default();

        info!("Processing torrent for {}", episode.display_title());
        let submission = self.submit(magnet, api_key).await?;
        let torrent_id = submission.torrent_id;

        let report = ReadinessPoller::new(
            self.debrid.as_ref(),
            self.clock.as_ref(),
            PollerConfig::from(&self.config),
        )
        .run(torrent_id, api_key)
        .await;
        debug!(
            "Torrent {} poll finished: {} after {} polls ({:?})",
            torrent_id,
            report.state.as_str(),
            report.polls,
            report.elapsed
        );

        let status = report
            .state
            .into_status()
            .ok_or_else(|| ResolveError::NotReady {
                arc_title: episode.arc_title.clone(),
            })?;

        let candidates = select_candidates(&status.files, self.config.max_candidates);
        debug!(
            "Found {} video files among {} files",
            candidates.len(),
            status.files.len()
        );

        let mut streams = Vec::with_capacity(candidates.len());
        for file in &candidates {
            let link = match self
                .debrid
                .get_direct_link(torrent_id, file.id, api_key)
                .await
            {
                Ok(link) => link,
                Err(e) => {
                    warn!("Error getting download link for file {}: {}", file.name, e);
                    continue;
                }
            };

            streams.push(StreamDescriptor::Playable {
                label: format!("TorBox - {}", episode.arc_title),
                title: format!(
                    "📺 {}\n💾 {}\n⚡ Quality: {}",
                    file.name,
                    format_size_gb(file.size_bytes),
                    Quality::from_filename(&file.name)
                ),
                url: link.url,
                group_key: format!("onepace-{}", episode.id),
            });
        }

        if streams.is_empty() {
            streams.push(StreamDescriptor::processing(
                &episode.arc_title,
                status.state,
                status.progress,
            ));
        }

        Ok(streams)
    }

    /// Submit a magnet, reusing a live cached submission.
    async fn submit(&self, magnet: &str, api_key: &str) -> Result<SubmissionResult, ResolveError> {
        if let Some(cached) = self.cache.get(magnet) {
            return Ok(cached);
        }

        let submission = self.debrid.submit_magnet(magnet, api_key).await?;
        if !submission.success {
            return Err(DebridError::Rejected("Failed to add torrent to TorBox".to_string()).into());
        }

        info!("Torrent submitted to {}: {}", self.debrid.name(), submission.torrent_id);
        self.cache.put(magnet, submission.clone());
        Ok(submission)
    }
}
