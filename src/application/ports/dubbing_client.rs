use async_trait::async_trait;

use super::ByteStream;
use crate::domain::{DubStatus, RemoteJobId};

/// Source media handed to the remote service.
pub struct MediaSubmission {
    pub filename: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub stream: ByteStream,
}

#[async_trait]
pub trait DubbingClient: Send + Sync {
    /// Starts a remote job. Languages are forwarded verbatim.
    async fn submit(
        &self,
        media: MediaSubmission,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RemoteJobId, DubbingClientError>;

    async fn poll_status(&self, job_id: &RemoteJobId) -> Result<DubStatus, DubbingClientError>;

    /// Only meaningful once the job reported `dubbed`.
    async fn fetch_result(
        &self,
        job_id: &RemoteJobId,
        target_lang: &str,
    ) -> Result<ByteStream, DubbingClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DubbingClientError {
    #[error("submission rejected: {0}")]
    Submission(String),
    #[error("remote processing failed: {0}")]
    RemoteProcessing(String),
    #[error("transfer failed: {0}")]
    Transfer(String),
}
