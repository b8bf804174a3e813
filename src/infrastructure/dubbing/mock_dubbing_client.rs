use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::application::ports::{
    ByteStream, DubbingClient, DubbingClientError, MediaSubmission, collect_bytes, single_chunk,
};
use crate::domain::{DubStatus, RemoteJobId};

/// What the mock saw on `submit`.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub job_id: String,
    pub filename: String,
    pub content_type: String,
    pub source_lang: String,
    pub target_lang: String,
    pub data: Bytes,
}

/// Scripted stand-in for the remote dubbing service.
///
/// Returns the scripted statuses in order and then keeps reporting `dubbed`.
/// Each submit gets its own `mock-<uuid>` job id. Without an explicit result
/// it "dubs" by echoing the bytes submitted under the fetched job id; the
/// payload is released once fetched or once the job reports `failed`.
pub struct MockDubbingClient {
    issue_job_ids: bool,
    record_submissions: bool,
    statuses: Mutex<VecDeque<DubStatus>>,
    result: Option<Bytes>,
    payloads: Mutex<HashMap<String, Bytes>>,
    submissions: Mutex<Vec<RecordedSubmission>>,
    polls: AtomicUsize,
    fetches: AtomicUsize,
}

impl MockDubbingClient {
    pub fn echo() -> Self {
        Self {
            issue_job_ids: true,
            record_submissions: true,
            statuses: Mutex::new(VecDeque::new()),
            result: None,
            payloads: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Reports `queued` `pending_polls` times, then `dubbed`.
    pub fn completing_after(pending_polls: usize, result: Bytes) -> Self {
        let mut statuses: VecDeque<DubStatus> =
            std::iter::repeat_n(DubStatus::Queued, pending_polls).collect();
        statuses.push_back(DubStatus::Dubbed);
        Self {
            statuses: Mutex::new(statuses),
            result: Some(result),
            ..Self::echo()
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = DubStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            ..Self::echo()
        }
    }

    /// Accepts the upload but never hands out a job id.
    pub fn without_job_id() -> Self {
        Self {
            issue_job_ids: false,
            ..Self::echo()
        }
    }

    /// Stops keeping a log of submissions; echo payloads are still held until fetched.
    pub fn without_recording(mut self) -> Self {
        self.record_submissions = false;
        self
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of submitted payloads not yet fetched or released.
    pub fn pending_payloads(&self) -> usize {
        self.payloads.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn take_payload(&self, job_id: &RemoteJobId) -> Result<Option<Bytes>, DubbingClientError> {
        Ok(self
            .payloads
            .lock()
            .map_err(|_| DubbingClientError::Transfer("payload store poisoned".to_string()))?
            .remove(job_id.as_str()))
    }
}

impl Default for MockDubbingClient {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl DubbingClient for MockDubbingClient {
    async fn submit(
        &self,
        media: MediaSubmission,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RemoteJobId, DubbingClientError> {
        let data = collect_bytes(media.stream)
            .await
            .map_err(|e| DubbingClientError::Submission(format!("read: {}", e)))?;
        let job_id = format!("mock-{}", Uuid::new_v4());

        if self.record_submissions {
            if let Ok(mut submissions) = self.submissions.lock() {
                submissions.push(RecordedSubmission {
                    job_id: job_id.clone(),
                    filename: media.filename,
                    content_type: media.content_type,
                    source_lang: source_lang.to_string(),
                    target_lang: target_lang.to_string(),
                    data: data.clone(),
                });
            }
        }

        if !self.issue_job_ids {
            return Err(DubbingClientError::Submission(
                "Failed to start dubbing".to_string(),
            ));
        }

        if self.result.is_none() {
            self.payloads
                .lock()
                .map_err(|_| DubbingClientError::Submission("payload store poisoned".to_string()))?
                .insert(job_id.clone(), data);
        }

        RemoteJobId::new(job_id)
            .ok_or_else(|| DubbingClientError::Submission("Failed to start dubbing".to_string()))
    }

    async fn poll_status(&self, job_id: &RemoteJobId) -> Result<DubStatus, DubbingClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .statuses
            .lock()
            .map_err(|_| DubbingClientError::Transfer("status script poisoned".to_string()))?
            .pop_front()
            .unwrap_or(DubStatus::Dubbed);
        if next == DubStatus::Failed {
            self.take_payload(job_id)?;
        }
        Ok(next)
    }

    async fn fetch_result(
        &self,
        job_id: &RemoteJobId,
        _target_lang: &str,
    ) -> Result<ByteStream, DubbingClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let echoed = self.take_payload(job_id)?;
        let data = match (&self.result, echoed) {
            (Some(result), _) => result.clone(),
            (None, Some(echoed)) => echoed,
            (None, None) => {
                return Err(DubbingClientError::Transfer(format!(
                    "no dubbed media for job {}",
                    job_id.as_str()
                )));
            }
        };
        Ok(single_chunk(data))
    }
}
