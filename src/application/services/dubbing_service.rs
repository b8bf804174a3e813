use std::sync::Arc;

use tokio::time::Instant;

use super::{PollPolicy, RetentionScheduler};
use crate::application::ports::{
    DubbingClient, DubbingClientError, MediaStore, MediaSubmission, StorageError,
};
use crate::domain::{Artifact, ArtifactMetadata, DubJob, DubStatus, RemoteJobId, StagedUpload, Upload};

/// Result of one completed dub request.
#[derive(Debug, Clone)]
pub struct DubbingOutcome {
    pub artifact: Artifact,
    pub job: DubJob,
}

/// Drives a single upload through the remote dubbing service and into storage.
pub struct DubbingService {
    dubbing_client: Arc<dyn DubbingClient>,
    media_store: Arc<dyn MediaStore>,
    retention: RetentionScheduler,
    poll_policy: PollPolicy,
}

impl DubbingService {
    pub fn new(
        dubbing_client: Arc<dyn DubbingClient>,
        media_store: Arc<dyn MediaStore>,
        retention: RetentionScheduler,
        poll_policy: PollPolicy,
    ) -> Self {
        Self {
            dubbing_client,
            media_store,
            retention,
            poll_policy,
        }
    }

    pub fn media_store(&self) -> &Arc<dyn MediaStore> {
        &self.media_store
    }

    #[tracing::instrument(
        skip(self, upload),
        fields(
            filename = %upload.filename,
            size_bytes = upload.size_bytes(),
            remote_job_id = tracing::field::Empty,
        )
    )]
    pub async fn handle_dub_request(
        &self,
        upload: Upload,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<DubbingOutcome, DubbingError> {
        let mut job = DubJob::new(source_lang, target_lang);

        let staged = self
            .media_store
            .stage(upload)
            .await
            .map_err(DubbingError::Staging)?;
        tracing::debug!(path = %staged.path, "Upload staged");

        let result = self.run_pipeline(&mut job, &staged).await;

        self.discard_staged(&staged).await;

        let artifact = result?;
        tracing::info!(
            path = %artifact.path,
            reference = %artifact.reference.as_str(),
            polls = job.poll_count,
            "Dubbing completed"
        );

        Ok(DubbingOutcome { artifact, job })
    }

    async fn run_pipeline(
        &self,
        job: &mut DubJob,
        staged: &StagedUpload,
    ) -> Result<Artifact, DubbingError> {
        let remote_job_id = self.submit(job, staged).await?;
        tracing::Span::current().record("remote_job_id", remote_job_id.as_str());
        job.submitted(remote_job_id.clone());
        tracing::info!(
            source_lang = %job.source_lang,
            target_lang = %job.target_lang,
            "Dubbing job submitted"
        );

        self.await_completion(job, &remote_job_id).await?;

        let dubbed = self
            .dubbing_client
            .fetch_result(&remote_job_id, &job.target_lang)
            .await
            .map_err(DubbingError::from)?;

        let metadata = ArtifactMetadata::new(staged.filename.clone(), job.target_lang.clone());
        let artifact = self
            .media_store
            .persist(dubbed, &metadata)
            .await
            .map_err(DubbingError::Persist)?;

        if let Err(e) = self.retention.schedule(&artifact) {
            tracing::error!(error = %e, path = %artifact.path, "Failed to schedule artifact deletion");
        }

        Ok(artifact)
    }

    async fn submit(
        &self,
        job: &DubJob,
        staged: &StagedUpload,
    ) -> Result<RemoteJobId, DubbingError> {
        let source = self
            .media_store
            .read(&staged.path, None)
            .await
            .map_err(DubbingError::Staging)?;

        let media = MediaSubmission {
            filename: staged.filename.clone(),
            content_type: staged.content_type.clone(),
            content_length: Some(source.total_size),
            stream: source.stream,
        };

        self.dubbing_client
            .submit(media, &job.source_lang, &job.target_lang)
            .await
            .map_err(DubbingError::from)
    }

    /// Sleeps one interval before every poll, then stops on `dubbed` or `failed`.
    async fn await_completion(
        &self,
        job: &mut DubJob,
        remote_job_id: &RemoteJobId,
    ) -> Result<(), DubbingError> {
        let started = Instant::now();

        loop {
            if let Some(max) = self.poll_policy.max_attempts {
                if job.poll_count >= max {
                    return Err(DubbingError::PollLimitExceeded {
                        attempts: job.poll_count,
                    });
                }
            }
            if let Some(max) = self.poll_policy.max_duration {
                if started.elapsed() >= max {
                    return Err(DubbingError::PollLimitExceeded {
                        attempts: job.poll_count,
                    });
                }
            }

            tokio::time::sleep(self.poll_policy.interval).await;

            let status = self
                .dubbing_client
                .poll_status(remote_job_id)
                .await
                .map_err(DubbingError::from)?;
            tracing::debug!(status = %status, attempt = job.poll_count + 1, "Dubbing status polled");

            if job.record_poll(status) {
                break;
            }
        }

        match job.status {
            DubStatus::Failed => Err(DubbingError::RemoteProcessing(format!(
                "job {} reported failed",
                remote_job_id
            ))),
            _ => Ok(()),
        }
    }

    async fn discard_staged(&self, staged: &StagedUpload) {
        match self.media_store.delete(&staged.path).await {
            Ok(outcome) => {
                tracing::debug!(path = %staged.path, outcome = ?outcome, "Staged upload removed");
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %staged.path, "Failed to delete staged upload");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DubbingError {
    #[error("staging: {0}")]
    Staging(StorageError),
    #[error("submission: {0}")]
    Submission(String),
    #[error("remote processing: {0}")]
    RemoteProcessing(String),
    #[error("transfer: {0}")]
    Transfer(String),
    #[error("persist: {0}")]
    Persist(StorageError),
    #[error("gave up polling after {attempts} attempts")]
    PollLimitExceeded { attempts: u32 },
}

impl From<DubbingClientError> for DubbingError {
    fn from(e: DubbingClientError) -> Self {
        match e {
            DubbingClientError::Submission(msg) => DubbingError::Submission(msg),
            DubbingClientError::RemoteProcessing(msg) => DubbingError::RemoteProcessing(msg),
            DubbingClientError::Transfer(msg) => DubbingError::Transfer(msg),
        }
    }
}
