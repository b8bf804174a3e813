use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Key;

use crate::application::ports::{DeleteOutcome, MediaStore};
use crate::domain::{Artifact, StoragePath};

/// Disk-served artifacts are short lived.
pub const DEFAULT_LOCAL_RETENTION: Duration = Duration::from_secs(10 * 60);
/// Host-served artifacts stay around for two hours.
pub const DEFAULT_HOSTED_RETENTION: Duration = Duration::from_secs(2 * 60 * 60);
/// Upper bound on one delete so a stuck store call cannot hold back later expiries.
pub const PURGE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

enum RetentionCommand {
    Schedule { path: StoragePath, delay: Duration },
}

/// Handle used to register artifacts for delayed deletion.
#[derive(Clone)]
pub struct RetentionScheduler {
    sender: mpsc::UnboundedSender<RetentionCommand>,
    delay: Duration,
}

impl RetentionScheduler {
    /// Returns the handle and the worker that must be spawned to drive it.
    pub fn new(store: Arc<dyn MediaStore>, delay: Duration) -> (Self, RetentionWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = RetentionWorker {
            receiver,
            store,
            queue: DelayQueue::new(),
            keys: HashMap::new(),
        };
        (Self { sender, delay }, worker)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&self, artifact: &Artifact) -> Result<(), RetentionError> {
        tracing::info!(
            path = %artifact.path,
            expires_at = %artifact.expires_at(self.delay).to_rfc3339(),
            "Artifact scheduled for deletion"
        );
        self.schedule_after(artifact.path.clone(), self.delay)
    }

    /// Rescheduling a pending path resets its timer.
    pub fn schedule_after(&self, path: StoragePath, delay: Duration) -> Result<(), RetentionError> {
        self.sender
            .send(RetentionCommand::Schedule { path, delay })
            .map_err(|_| RetentionError::WorkerStopped)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("retention worker is not running")]
    WorkerStopped,
}

/// Owns every pending expiry and performs the deletions.
pub struct RetentionWorker {
    receiver: mpsc::UnboundedReceiver<RetentionCommand>,
    store: Arc<dyn MediaStore>,
    queue: DelayQueue<StoragePath>,
    keys: HashMap<StoragePath, Key>,
}

impl RetentionWorker {
    /// Runs until every scheduler handle is dropped and nothing is pending.
    pub async fn run(mut self) {
        tracing::info!("Retention worker started");
        let mut accepting = true;

        loop {
            tokio::select! {
                command = self.receiver.recv(), if accepting => match command {
                    Some(command) => self.apply(command),
                    None => {
                        accepting = false;
                        tracing::debug!(pending = self.keys.len(), "Retention channel closed, draining");
                    }
                },
                Some(expired) = self.queue.next(), if !self.queue.is_empty() => {
                    let path = expired.into_inner();
                    self.keys.remove(&path);
                    self.purge(&path).await;
                }
                else => break,
            }
        }

        tracing::info!("Retention worker stopped");
    }

    fn apply(&mut self, command: RetentionCommand) {
        match command {
            RetentionCommand::Schedule { path, delay } => match self.keys.get(&path) {
                Some(key) => {
                    self.queue.reset(key, delay);
                    tracing::debug!(path = %path, delay_secs = delay.as_secs(), "Retention timer reset");
                }
                None => {
                    let key = self.queue.insert(path.clone(), delay);
                    self.keys.insert(path, key);
                }
            },
        }
    }

    async fn purge(&self, path: &StoragePath) {
        let Ok(outcome) = tokio::time::timeout(PURGE_TIMEOUT, self.store.delete(path)).await else {
            tracing::error!(
                path = %path,
                timeout_secs = PURGE_TIMEOUT.as_secs(),
                "Auto-delete timed out"
            );
            return;
        };

        match outcome {
            Ok(DeleteOutcome::Deleted) => {
                tracing::info!(path = %path, "Dubbed artifact auto-deleted");
            }
            Ok(DeleteOutcome::NotFound) => {
                tracing::debug!(path = %path, "Artifact already removed before retention expiry");
            }
            Err(e) => {
                tracing::error!(error = %e, path = %path, "Auto-delete failed");
            }
        }
    }
}
