use std::io;

use bytes::Bytes;
use futures::stream;

use dubrelay::application::ports::{
    DeleteOutcome, MediaStore, StorageError, collect_bytes, single_chunk,
};
use dubrelay::domain::{
    ArtifactMetadata, ArtifactReference, ByteRange, RangeError, StoragePath, Upload,
};
use dubrelay::infrastructure::storage::LocalMediaStore;

fn create_test_store() -> (tempfile::TempDir, LocalMediaStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalMediaStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

fn sample_upload(data: &'static [u8]) -> Upload {
    Upload::new("clip.mov", Some("video/quicktime"), Bytes::from_static(data))
}

#[tokio::test]
async fn given_new_store_when_created_then_upload_and_artifact_dirs_exist() {
    let (dir, _store) = create_test_store();

    assert!(dir.path().join("uploads").is_dir());
    assert!(dir.path().join("dubs").is_dir());
}

#[tokio::test]
async fn given_upload_when_staging_then_file_lands_under_uploads() {
    let (dir, store) = create_test_store();

    let staged = store.stage(sample_upload(b"source video")).await.unwrap();

    assert!(staged.path.is_upload());
    assert_eq!(staged.size_bytes, 12);
    assert_eq!(staged.filename, "clip.mov");
    assert!(dir.path().join(staged.path.as_str()).is_file());
}

#[tokio::test]
async fn given_chunked_stream_when_persisting_then_artifact_is_servable_by_name() {
    let (dir, store) = create_test_store();
    let chunks = vec![Ok(Bytes::from("dubbed ")), Ok(Bytes::from("video"))];
    let metadata = ArtifactMetadata::new("clip.mov", "es");

    let artifact = store
        .persist(Box::pin(stream::iter(chunks)), &metadata)
        .await
        .unwrap();

    assert!(artifact.path.is_artifact());
    assert_eq!(artifact.size_bytes, Some(12));
    match &artifact.reference {
        ArtifactReference::File(name) => {
            assert!(name.starts_with("dubbed-"));
            assert!(name.ends_with("-clip.mp4"));
            assert!(dir.path().join("dubs").join(name).is_file());
        }
        other => panic!("expected a file reference, got {:?}", other),
    }
}

#[tokio::test]
async fn given_stream_error_when_persisting_then_returns_error() {
    let (_dir, store) = create_test_store();
    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::other("connection reset")),
    ];

    let result = store
        .persist(
            Box::pin(stream::iter(chunks)),
            &ArtifactMetadata::new("clip.mov", "es"),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn given_persisted_artifact_when_reading_without_range_then_whole_body_returned() {
    let (_dir, store) = create_test_store();
    let artifact = store
        .persist(
            single_chunk(Bytes::from_static(b"0123456789")),
            &ArtifactMetadata::new("clip.mov", "es"),
        )
        .await
        .unwrap();

    let read = store.read(&artifact.path, None).await.unwrap();

    assert_eq!(read.total_size, 10);
    assert_eq!(read.range, None);
    assert_eq!(read.content_length(), 10);
    assert_eq!(collect_bytes(read.stream).await.unwrap(), "0123456789");
}

#[tokio::test]
async fn given_persisted_artifact_when_reading_range_then_only_window_returned() {
    let (_dir, store) = create_test_store();
    let artifact = store
        .persist(
            single_chunk(Bytes::from_static(b"0123456789")),
            &ArtifactMetadata::new("clip.mov", "es"),
        )
        .await
        .unwrap();

    let range = ByteRange::parse("bytes=2-5").unwrap();
    let read = store.read(&artifact.path, Some(range)).await.unwrap();

    assert_eq!(read.total_size, 10);
    assert_eq!(read.content_length(), 4);
    assert_eq!(collect_bytes(read.stream).await.unwrap(), "2345");
}

#[tokio::test]
async fn given_range_past_end_when_reading_then_range_is_unsatisfiable() {
    let (_dir, store) = create_test_store();
    let artifact = store
        .persist(
            single_chunk(Bytes::from_static(b"0123456789")),
            &ArtifactMetadata::new("clip.mov", "es"),
        )
        .await
        .unwrap();

    let range = ByteRange::parse("bytes=50-").unwrap();
    let result = store.read(&artifact.path, Some(range)).await;

    assert!(matches!(
        result,
        Err(StorageError::InvalidRange(RangeError::Unsatisfiable(10)))
    ));
}

#[tokio::test]
async fn given_missing_artifact_when_reading_then_not_found() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::artifact("dubbed-missing.mp4").unwrap();

    let result = store.read(&path, None).await;

    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn given_staged_upload_when_deleted_twice_then_second_delete_reports_not_found() {
    let (dir, store) = create_test_store();
    let staged = store.stage(sample_upload(b"source video")).await.unwrap();

    let first = store.delete(&staged.path).await.unwrap();
    let second = store.delete(&staged.path).await.unwrap();

    assert_eq!(first, DeleteOutcome::Deleted);
    assert_eq!(second, DeleteOutcome::NotFound);
    assert!(!dir.path().join(staged.path.as_str()).exists());
}
