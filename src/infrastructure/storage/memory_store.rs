use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::application::ports::{
    ByteStream, DeleteOutcome, MediaRead, MediaStore, StorageError, single_chunk,
};
use crate::domain::{Artifact, ArtifactMetadata, ByteRange, StagedUpload, StoragePath, Upload};

/// Keeps uploads in process memory and hands dubbed output to a hosting store.
///
/// Nothing dubbed is kept here: `persist`, and `read`/`delete` of anything that
/// is not a staged upload, go straight to `host`.
pub struct InMemoryMediaStore {
    staged: Mutex<HashMap<StoragePath, Bytes>>,
    host: Arc<dyn MediaStore>,
}

impl InMemoryMediaStore {
    pub fn new(host: Arc<dyn MediaStore>) -> Self {
        Self {
            staged: Mutex::new(HashMap::new()),
            host,
        }
    }

    pub fn staged_count(&self) -> usize {
        self.staged.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn staged_bytes(&self, path: &StoragePath) -> Result<Option<Bytes>, StorageError> {
        let staged = self
            .staged
            .lock()
            .map_err(|_| StorageError::DownloadFailed("staging buffer poisoned".to_string()))?;
        Ok(staged.get(path).cloned())
    }
}

fn slice_read(data: Bytes, range: Option<ByteRange>) -> Result<MediaRead, StorageError> {
    let total_size = data.len() as u64;
    match range {
        Some(range) => {
            let resolved = range.resolve(total_size)?;
            let window = data.slice(resolved.start as usize..=resolved.end as usize);
            Ok(MediaRead {
                total_size,
                range: Some(resolved),
                stream: single_chunk(window),
            })
        }
        None => Ok(MediaRead {
            total_size,
            range: None,
            stream: single_chunk(data),
        }),
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn stage(&self, upload: Upload) -> Result<StagedUpload, StorageError> {
        let path = StoragePath::for_upload(&upload.filename);
        let size_bytes = upload.size_bytes();

        self.staged
            .lock()
            .map_err(|_| StorageError::UploadFailed("staging buffer poisoned".to_string()))?
            .insert(path.clone(), upload.data);

        Ok(StagedUpload {
            path,
            filename: upload.filename,
            content_type: upload.content_type,
            size_bytes,
        })
    }

    async fn persist(
        &self,
        stream: ByteStream,
        metadata: &ArtifactMetadata,
    ) -> Result<Artifact, StorageError> {
        self.host.persist(stream, metadata).await
    }

    async fn delete(&self, path: &StoragePath) -> Result<DeleteOutcome, StorageError> {
        if !path.is_upload() {
            return self.host.delete(path).await;
        }

        let removed = self
            .staged
            .lock()
            .map_err(|_| StorageError::DeleteFailed("staging buffer poisoned".to_string()))?
            .remove(path);

        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn read(
        &self,
        path: &StoragePath,
        range: Option<ByteRange>,
    ) -> Result<MediaRead, StorageError> {
        if !path.is_upload() {
            return self.host.read(path, range).await;
        }

        match self.staged_bytes(path)? {
            Some(data) => slice_read(data, range),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }
}
