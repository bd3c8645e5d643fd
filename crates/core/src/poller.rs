//! Torrent readiness polling.
//!
//! After a magnet is submitted the debrid service needs time to fetch metadata
//! (or finds it in its cache). The poller asks for the status at a fixed
//! interval until the torrent is ready or the deadline passes. A timeout is not
//! fatal: the last status snapshot is handed back so the caller can still use
//! whatever files are already listed.

use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::ResolverConfig;
use crate::debrid::{DebridClient, TorrentHandle, TorrentStatus};
use crate::metrics::POLL_OUTCOMES;

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            deadline: Duration::from_secs(30),
        }
    }
}

impl From<&ResolverConfig> for PollerConfig {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            deadline: config.ready_timeout(),
        }
    }
}

/// Poller state. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Pending,
    /// The torrent reported a ready state.
    Ready(TorrentStatus),
    /// Deadline passed; carries the last status observed.
    TimedOut(TorrentStatus),
    /// Deadline passed without a single successful status query.
    Failed,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Pending => "pending",
            PollState::Ready(_) => "ready",
            PollState::TimedOut(_) => "timed_out",
            PollState::Failed => "failed",
        }
    }

    /// The status snapshot carried by a terminal state, if any.
    pub fn into_status(self) -> Option<TorrentStatus> {
        match self {
            PollState::Ready(status) | PollState::TimedOut(status) => Some(status),
            PollState::Pending | PollState::Failed => None,
        }
    }
}

/// Final state plus bookkeeping for logs and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub state: PollState,
    /// Number of status queries issued (including failed ones).
    pub polls: u32,
    pub elapsed: Duration,
}

/// Waits for a submitted torrent to become ready.
pub struct ReadinessPoller<'a> {
    client: &'a dyn DebridClient,
    clock: &'a dyn Clock,
    config: PollerConfig,
}

impl<'a> ReadinessPoller<'a> {
    pub fn new(client: &'a dyn DebridClient, clock: &'a dyn Clock, config: PollerConfig) -> Self {
        Self {
            client,
            clock,
            config,
        }
    }

    /// Poll until a terminal state is reached.
    ///
    /// Sleeps never run past the deadline. A status query already in flight
    /// when the deadline passes is bounded only by the debrid client timeout.
    pub async fn run(&self, torrent_id: TorrentHandle, api_key: &str) -> PollReport {
        let start = self.clock.now();
        let mut last_status: Option<TorrentStatus> = None;
        let mut polls = 0u32;

        let mut state = PollState::Pending;

        while !state.is_terminal() {
            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed >= self.config.deadline {
                state = match last_status.take() {
                    Some(status) => PollState::TimedOut(status),
                    None => PollState::Failed,
                };
                continue;
            }

            polls += 1;
            match self.client.get_status(torrent_id, api_key).await {
                Ok(status) if status.is_ready() => {
                    state = PollState::Ready(status);
                    continue;
                }
                Ok(status) => {
                    debug!(
                        "Torrent {} status: {}, progress: {:.0}%",
                        torrent_id, status.state, status.progress
                    );
                    last_status = Some(status);
                }
                Err(e) => {
                    warn!("Error checking torrent {} status: {}", torrent_id, e);
                }
            }

            let remaining = self
                .config
                .deadline
                .saturating_sub(self.clock.now().saturating_duration_since(start));
            self.clock.sleep(self.config.interval.min(remaining)).await;
        }

        POLL_OUTCOMES.with_label_values(&[state.as_str()]).inc();

        PollReport {
            state,
            polls,
            elapsed: self.clock.now().saturating_duration_since(start),
        }
    }
}
