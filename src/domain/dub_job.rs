use std::fmt;

use chrono::{DateTime, Utc};

use super::DubStatus;

/// Opaque job identifier handed out by the remote dubbing service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteJobId(String);

impl RemoteJobId {
    /// Returns `None` for a blank identifier; the remote service never issues one.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One request's view of a remote dubbing job. Lives only as long as the request.
#[derive(Debug, Clone)]
pub struct DubJob {
    pub source_lang: String,
    pub target_lang: String,
    pub remote_job_id: Option<RemoteJobId>,
    pub status: DubStatus,
    pub poll_count: u32,
    pub created_at: DateTime<Utc>,
}

impl DubJob {
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            remote_job_id: None,
            status: DubStatus::Queued,
            poll_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn submitted(&mut self, remote_job_id: RemoteJobId) {
        self.remote_job_id = Some(remote_job_id);
        self.status = DubStatus::Queued;
    }

    /// Records a polled status and reports whether the job has finished.
    pub fn record_poll(&mut self, status: DubStatus) -> bool {
        self.poll_count += 1;
        self.status = status;
        status.is_terminal()
    }
}
