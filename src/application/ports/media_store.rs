use std::io;

use async_trait::async_trait;

use super::ByteStream;
use crate::domain::{
    Artifact, ArtifactMetadata, ByteRange, RangeError, ResolvedRange, StagedUpload, StoragePath,
    Upload,
};

/// Where uploads are staged and dubbed output is kept and served from.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn stage(&self, upload: Upload) -> Result<StagedUpload, StorageError>;

    /// Stores dubbed bytes under a fresh, never reused key.
    async fn persist(
        &self,
        stream: ByteStream,
        metadata: &ArtifactMetadata,
    ) -> Result<Artifact, StorageError>;

    /// Removing a missing object reports `NotFound` instead of failing.
    async fn delete(&self, path: &StoragePath) -> Result<DeleteOutcome, StorageError>;

    async fn read(
        &self,
        path: &StoragePath,
        range: Option<ByteRange>,
    ) -> Result<MediaRead, StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// A readable window of a stored object.
pub struct MediaRead {
    pub total_size: u64,
    /// Set when the read was ranged.
    pub range: Option<ResolvedRange>,
    pub stream: ByteStream,
}

impl MediaRead {
    pub fn content_length(&self) -> u64 {
        self.range.map_or(self.total_size, |r| r.length())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("misconfigured store: {0}")]
    Misconfigured(String),
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
