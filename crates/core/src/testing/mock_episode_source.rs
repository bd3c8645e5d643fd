//! Mock episode source for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::catalog::{CatalogError, Episode, EpisodeSource};

#[derive(Debug, Default)]
struct MockEpisodeState {
    episodes: Vec<Episode>,
    error: Option<String>,
    calls: usize,
}

/// Mock implementation of the EpisodeSource trait.
///
/// Returns the configured episodes, or a parse error when `set_error` was
/// called.
#[derive(Debug, Clone, Default)]
pub struct MockEpisodeSource {
    state: Arc<Mutex<MockEpisodeState>>,
}

impl MockEpisodeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_episodes(episodes: Vec<Episode>) -> Self {
        let source = Self::new();
        source.set_episodes(episodes);
        source
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockEpisodeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_episodes(&self, episodes: Vec<Episode>) {
        self.lock().episodes = episodes;
    }

    /// Make every listing fail until cleared.
    pub fn set_error(&self, message: impl Into<String>) {
        self.lock().error = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Number of listings requested.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }
}

#[async_trait]
impl EpisodeSource for MockEpisodeSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, CatalogError> {
        let mut state = self.lock();
        state.calls += 1;
        match &state.error {
            Some(message) => Err(CatalogError::ParseError(message.clone())),
            None => Ok(state.episodes.clone()),
        }
    }
}
