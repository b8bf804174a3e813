use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use dubrelay::application::ports::{
    DeleteOutcome, MediaStore, StorageError, collect_bytes, single_chunk,
};
use dubrelay::domain::{
    ArtifactMetadata, ArtifactReference, ByteRange, RangeError, StoragePath, Upload,
};
use dubrelay::infrastructure::HttpTimeouts;
use dubrelay::infrastructure::storage::{
    CloudinaryCredentials, CloudinaryMediaStore, sign_params,
};

const CLOUD: &str = "demo";
const SECRET: &str = "test-secret";
const HOSTED_BODY: &[u8] = b"0123456789";

struct RecordedUpload {
    fields: HashMap<String, String>,
    file: Vec<u8>,
    file_name: Option<String>,
}

#[derive(Clone, Default)]
struct HostState {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    live_ids: Arc<Mutex<Vec<String>>>,
}

async fn upload(State(state): State<HostState>, mut multipart: Multipart) -> Json<serde_json::Value> {
    let mut fields = HashMap::new();
    let mut file = Vec::new();
    let mut file_name = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file_name = field.file_name().map(String::from);
            file = field.bytes().await.unwrap().to_vec();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }

    let public_id = fields.get("public_id").cloned().unwrap_or_default();
    let size = file.len();
    state.live_ids.lock().unwrap().push(public_id.clone());
    state.uploads.lock().unwrap().push(RecordedUpload {
        fields,
        file,
        file_name,
    });

    Json(serde_json::json!({
        "secure_url": format!("https://media.example/{}.mp4", public_id),
        "bytes": size,
    }))
}

async fn destroy(
    State(state): State<HostState>,
    Form(params): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let public_id = params.get("public_id").cloned().unwrap_or_default();
    if public_id.contains("stalled") {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    let mut live = state.live_ids.lock().unwrap();
    let result = match live.iter().position(|id| *id == public_id) {
        Some(index) => {
            live.remove(index);
            "ok"
        }
        None => "not found",
    };
    Json(serde_json::json!({ "result": result }))
}

async fn deliver(Path((_cloud, path)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if path.contains("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let total = HOSTED_BODY.len() as u64;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| ByteRange::parse(v).ok());

    match range.map(|r| r.resolve(total)) {
        None => (StatusCode::OK, Bytes::from_static(HOSTED_BODY)).into_response(),
        Some(Ok(resolved)) => (
            StatusCode::PARTIAL_CONTENT,
            [(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", resolved.start, resolved.end, total),
            )],
            Bytes::copy_from_slice(
                &HOSTED_BODY[resolved.start as usize..=resolved.end as usize],
            ),
        )
            .into_response(),
        Some(Err(_)) => (
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, format!("bytes */{}", total))],
        )
            .into_response(),
    }
}

async fn start_mock_host() -> (String, HostState, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let state = HostState::default();

    let app = Router::new()
        .route("/v1_1/{cloud}/video/upload", post(upload))
        .route("/v1_1/{cloud}/video/destroy", post(destroy))
        .route("/{cloud}/video/upload/{*path}", get(deliver))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, state, shutdown_tx)
}

fn store_for(base_url: &str) -> CloudinaryMediaStore {
    store_with_read_timeout(base_url, Duration::from_secs(5))
}

fn store_with_read_timeout(base_url: &str, read: Duration) -> CloudinaryMediaStore {
    CloudinaryMediaStore::new(
        CloudinaryCredentials {
            cloud_name: CLOUD.to_string(),
            api_key: "test-key".to_string(),
            api_secret: SECRET.to_string(),
        },
        "neurodub".to_string(),
        Some(base_url.to_string()),
        Some(base_url.to_string()),
        HttpTimeouts {
            connect: Duration::from_secs(5),
            read,
        },
    )
    .unwrap()
}

#[test]
fn given_documented_params_when_signing_then_digest_matches_reference() {
    let params = [
        ("timestamp", "1315060510".to_string()),
        ("public_id", "sample_image".to_string()),
        ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string()),
    ];

    let signature = sign_params(&params, "abcd");

    assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
}

#[test]
fn given_empty_param_when_signing_then_it_is_left_out() {
    let with_empty = [
        ("public_id", "neurodub/dubs/clip".to_string()),
        ("format", String::new()),
        ("timestamp", "1700000000".to_string()),
    ];
    let without = [
        ("timestamp", "1700000000".to_string()),
        ("public_id", "neurodub/dubs/clip".to_string()),
    ];

    assert_eq!(
        sign_params(&with_empty, "secret"),
        sign_params(&without, "secret")
    );
    assert_eq!(
        sign_params(&without, "secret"),
        "42a7d60ad141000973866a2f45ae5ee03c2d4266"
    );
}

#[test]
fn given_artifact_path_when_deriving_public_id_then_folder_prefixed_and_extension_dropped() {
    let store = store_for("http://unused");
    let path = StoragePath::from_raw("dubs/dubbed-1-abcd1234-talk.mp4");

    assert_eq!(store.public_id(&path), "neurodub/dubs/dubbed-1-abcd1234-talk");
    assert_eq!(
        store.delivery_url(&path),
        "http://unused/demo/video/upload/neurodub/dubs/dubbed-1-abcd1234-talk.mp4"
    );
}

#[tokio::test]
async fn given_dubbed_stream_when_persisting_then_signed_mp4_upload_is_sent() {
    let (base_url, host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);

    let artifact = store
        .persist(
            single_chunk(Bytes::from_static(b"dubbed video")),
            &ArtifactMetadata::new("talk.mov", "es"),
        )
        .await
        .unwrap();

    let uploads = host.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    let recorded = &uploads[0];
    let public_id = store.public_id(&artifact.path);
    assert_eq!(recorded.fields["public_id"], public_id);
    assert!(public_id.starts_with("neurodub/dubs/dubbed-"));
    assert_eq!(recorded.fields["format"], "mp4");
    assert_eq!(recorded.fields["api_key"], "test-key");
    assert_eq!(recorded.file, b"dubbed video");
    assert_eq!(recorded.file_name.as_deref(), Some(artifact.path.file_name()));

    let expected_signature = sign_params(
        &[
            ("public_id", recorded.fields["public_id"].clone()),
            ("timestamp", recorded.fields["timestamp"].clone()),
            ("format", recorded.fields["format"].clone()),
        ],
        SECRET,
    );
    assert_eq!(recorded.fields["signature"], expected_signature);

    assert_eq!(
        artifact.reference,
        ArtifactReference::Url(format!("https://media.example/{}.mp4", public_id))
    );
    assert_eq!(artifact.size_bytes, Some(12));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_upload_when_staging_then_it_is_stored_under_uploads_without_format() {
    let (base_url, host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);

    let staged = store
        .stage(Upload::new(
            "talk.mov",
            Some("video/quicktime"),
            Bytes::from_static(b"source"),
        ))
        .await
        .unwrap();

    let uploads = host.uploads.lock().unwrap();
    assert!(staged.path.is_upload());
    assert!(uploads[0].fields["public_id"].starts_with("neurodub/uploads/"));
    assert!(!uploads[0].fields.contains_key("format"));
    assert_eq!(uploads[0].file, b"source");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_hosted_artifact_when_destroyed_twice_then_second_reports_not_found() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);
    let artifact = store
        .persist(
            single_chunk(Bytes::from_static(b"dubbed")),
            &ArtifactMetadata::new("talk.mov", "es"),
        )
        .await
        .unwrap();

    let first = store.delete(&artifact.path).await.unwrap();
    let second = store.delete(&artifact.path).await.unwrap();

    assert_eq!(first, DeleteOutcome::Deleted);
    assert_eq!(second, DeleteOutcome::NotFound);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_hosted_artifact_when_reading_without_range_then_full_body_streams() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);
    let path = StoragePath::artifact("dubbed-1-abcd1234-talk.mp4").unwrap();

    let read = store.read(&path, None).await.unwrap();

    assert_eq!(read.total_size, 10);
    assert_eq!(read.range, None);
    assert_eq!(collect_bytes(read.stream).await.unwrap(), HOSTED_BODY);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_hosted_artifact_when_reading_range_then_host_window_is_forwarded() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);
    let path = StoragePath::artifact("dubbed-1-abcd1234-talk.mp4").unwrap();

    let read = store
        .read(&path, Some(ByteRange::parse("bytes=2-5").unwrap()))
        .await
        .unwrap();

    assert_eq!(read.total_size, 10);
    assert_eq!(read.content_length(), 4);
    assert_eq!(collect_bytes(read.stream).await.unwrap(), "2345");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_range_past_end_when_reading_hosted_artifact_then_unsatisfiable() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);
    let path = StoragePath::artifact("dubbed-1-abcd1234-talk.mp4").unwrap();

    let result = store
        .read(&path, Some(ByteRange::parse("bytes=40-").unwrap()))
        .await;

    assert!(matches!(
        result,
        Err(StorageError::InvalidRange(RangeError::Unsatisfiable(10)))
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unknown_artifact_when_reading_then_not_found() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_for(&base_url);
    let path = StoragePath::artifact("dubbed-missing.mp4").unwrap();

    let result = store.read(&path, None).await;

    assert!(matches!(result, Err(StorageError::NotFound(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_host_rejects_upload_when_persisting_then_upload_failed() {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = Router::new().route(
        "/v1_1/{cloud}/video/upload",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                r#"{"error":{"message":"Invalid Signature"}}"#,
            )
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });
    let store = store_for(&base_url);

    let result = store
        .persist(
            single_chunk(Bytes::from_static(b"dubbed")),
            &ArtifactMetadata::new("talk.mov", "es"),
        )
        .await;

    match result {
        Err(StorageError::UploadFailed(message)) => assert!(message.contains("401")),
        other => panic!("expected upload failure, got {:?}", other.map(|a| a.path)),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_stalled_host_when_deleting_then_read_timeout_fails_the_delete() {
    let (base_url, _host, shutdown_tx) = start_mock_host().await;
    let store = store_with_read_timeout(&base_url, Duration::from_millis(200));
    let path = StoragePath::artifact("dubbed-1-abcd1234-stalled.mp4").unwrap();

    let started = std::time::Instant::now();
    let result = store.delete(&path).await;

    assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
    assert!(started.elapsed() < Duration::from_secs(2));
    shutdown_tx.send(()).ok();
}
