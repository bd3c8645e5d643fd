//! Mock debrid client for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::debrid::{
    DebridClient, DebridError, DirectLink, SubmissionResult, TorrentHandle, TorrentStatus,
};

/// A recorded debrid call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedDebridCall {
    Submit { magnet: String, api_key: String },
    Status { torrent_id: TorrentHandle },
    Link { torrent_id: TorrentHandle, file_id: u64 },
}

#[derive(Debug)]
struct MockDebridState {
    submit_result: Result<SubmissionResult, DebridError>,
    statuses: VecDeque<Result<TorrentStatus, DebridError>>,
    status_error: Option<DebridError>,
    last_status: Option<TorrentStatus>,
    link_results: HashMap<u64, Result<DirectLink, DebridError>>,
    calls: Vec<RecordedDebridCall>,
}

/// Mock implementation of the DebridClient trait.
///
/// Provides controllable behavior for testing:
/// - Configurable submission result (defaults to torrent id 1)
/// - A queue of status responses; once drained, the last successful status
///   repeats (or `status_error` is returned when set)
/// - Per-file direct link results (defaults to `https://mock.debrid/{torrent}/{file}`)
/// - Every call is recorded
///
/// # Example
///
/// ```rust,ignore
/// use pacebox_core::testing::{fixtures, MockDebridClient};
///
/// let client = MockDebridClient::new();
/// client.set_submit_result(Ok(SubmissionResult { success: true, torrent_id: 42 }));
/// client.push_status(Ok(fixtures::ready_status(vec![fixtures::video_file(1, "ep.mkv", 1024)])));
/// ```
#[derive(Debug, Clone)]
pub struct MockDebridClient {
    state: Arc<Mutex<MockDebridState>>,
}

impl Default for MockDebridClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDebridClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDebridState {
                submit_result: Ok(SubmissionResult {
                    success: true,
                    torrent_id: 1,
                }),
                statuses: VecDeque::new(),
                status_error: None,
                last_status: None,
                link_results: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockDebridState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_submit_result(&self, result: Result<SubmissionResult, DebridError>) {
        self.lock().submit_result = result;
    }

    /// Queue the next status response.
    pub fn push_status(&self, status: Result<TorrentStatus, DebridError>) {
        self.lock().statuses.push_back(status);
    }

    /// Error returned once the status queue is drained.
    pub fn set_status_error(&self, error: DebridError) {
        self.lock().status_error = Some(error);
    }

    pub fn set_link_result(&self, file_id: u64, result: Result<DirectLink, DebridError>) {
        self.lock().link_results.insert(file_id, result);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub fn calls(&self) -> Vec<RecordedDebridCall> {
        self.lock().calls.clone()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    /// Magnets submitted so far, in order.
    pub fn submitted_magnets(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedDebridCall::Submit { magnet, .. } => Some(magnet.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn submit_calls(&self) -> usize {
        self.count(|c| matches!(c, RecordedDebridCall::Submit { .. }))
    }

    pub fn status_calls(&self) -> usize {
        self.count(|c| matches!(c, RecordedDebridCall::Status { .. }))
    }

    pub fn link_calls(&self) -> usize {
        self.count(|c| matches!(c, RecordedDebridCall::Link { .. }))
    }

    /// File ids links were requested for, in order.
    pub fn linked_files(&self) -> Vec<u64> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedDebridCall::Link { file_id, .. } => Some(*file_id),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&RecordedDebridCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl DebridClient for MockDebridClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit_magnet(
        &self,
        magnet: &str,
        api_key: &str,
    ) -> Result<SubmissionResult, DebridError> {
        let mut state = self.lock();
        state.calls.push(RecordedDebridCall::Submit {
            magnet: magnet.to_string(),
            api_key: api_key.to_string(),
        });
        state.submit_result.clone()
    }

    async fn get_status(
        &self,
        torrent_id: TorrentHandle,
        _api_key: &str,
    ) -> Result<TorrentStatus, DebridError> {
        let mut state = self.lock();
        state.calls.push(RecordedDebridCall::Status { torrent_id });

        if let Some(next) = state.statuses.pop_front() {
            if let Ok(status) = &next {
                state.last_status = Some(status.clone());
            }
            return next;
        }
        if let Some(error) = &state.status_error {
            return Err(error.clone());
        }
        Ok(state
            .last_status
            .clone()
            .unwrap_or_else(TorrentStatus::unknown))
    }

    async fn get_direct_link(
        &self,
        torrent_id: TorrentHandle,
        file_id: u64,
        _api_key: &str,
    ) -> Result<DirectLink, DebridError> {
        let mut state = self.lock();
        state.calls.push(RecordedDebridCall::Link {
            torrent_id,
            file_id,
        });
        state.link_results.get(&file_id).cloned().unwrap_or_else(|| {
            Ok(DirectLink {
                url: format!("https://mock.debrid/{}/{}", torrent_id, file_id),
            })
        })
    }
}
