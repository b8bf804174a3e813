use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{GetOptions, GetRange, MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{
    ByteStream, DeleteOutcome, MediaRead, MediaStore, StorageError, single_chunk,
};
use crate::domain::{
    ARTIFACT_PREFIX, Artifact, ArtifactMetadata, ArtifactReference, ByteRange, StagedUpload,
    StoragePath, UPLOAD_PREFIX, Upload,
};

/// Disk-backed store: uploads go to `<base>/uploads`, artifacts are served from `<base>/dubs`.
pub struct LocalMediaStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalMediaStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(base_path.join(UPLOAD_PREFIX)).map_err(StorageError::Io)?;
        std::fs::create_dir_all(base_path.join(ARTIFACT_PREFIX)).map_err(StorageError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    async fn write(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<bytes::Bytes, io::Error>>,
    ) -> Result<u64, StorageError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(StorageError::Io(e));
                }
            };
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(total_bytes)
    }
}

fn not_found_or(path: &StoragePath, e: object_store::Error) -> StorageError {
    match e {
        object_store::Error::NotFound { .. } => StorageError::NotFound(path.to_string()),
        other => StorageError::DownloadFailed(other.to_string()),
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn stage(&self, upload: Upload) -> Result<StagedUpload, StorageError> {
        let path = StoragePath::for_upload(&upload.filename);
        let size_bytes = self.write(&path, single_chunk(upload.data)).await?;

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
        let path = StoragePath::for_artifact(&metadata.source_filename);
        let size = self.write(&path, stream).await?;
        let reference = ArtifactReference::File(path.file_name().to_string());

        tracing::debug!(path = %path, bytes = size, "Dubbed artifact written to disk");

        Ok(Artifact::new(path, reference, Some(size)))
    }

    async fn delete(&self, path: &StoragePath) -> Result<DeleteOutcome, StorageError> {
        let store_path = StorePath::from(path.as_str());
        match self.inner.delete(&store_path).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(object_store::Error::NotFound { .. }) => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn read(
        &self,
        path: &StoragePath,
        range: Option<ByteRange>,
    ) -> Result<MediaRead, StorageError> {
        let store_path = StorePath::from(path.as_str());
        let meta = self
            .inner
            .head(&store_path)
            .await
            .map_err(|e| not_found_or(path, e))?;
        let total_size = meta.size as u64;

        let resolved = range.map(|r| r.resolve(total_size)).transpose()?;
        let options = GetOptions {
            range: resolved
                .map(|r| GetRange::Bounded(r.start as usize..(r.end + 1) as usize)),
            ..Default::default()
        };

        let result = self
            .inner
            .get_opts(&store_path, options)
            .await
            .map_err(|e| not_found_or(path, e))?;

        Ok(MediaRead {
            total_size,
            range: resolved,
            stream: result.into_stream().map_err(io::Error::other).boxed(),
        })
    }
}
