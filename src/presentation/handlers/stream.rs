use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{MediaRead, StorageError};
use crate::domain::{ByteRange, MEDIA_CONTENT_TYPE, RangeError, StoragePath};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Video not found".to_string(),
        }),
    )
        .into_response()
}

fn range_not_satisfiable(total_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(CONTENT_RANGE, format!("bytes */{}", total_size))],
    )
        .into_response()
}

/// A Range header that cannot be parsed is ignored and the whole artifact served.
fn requested_range(headers: &HeaderMap) -> Option<ByteRange> {
    let raw = headers.get(RANGE)?.to_str().ok()?;
    match ByteRange::parse(raw) {
        Ok(range) => Some(range),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed Range header");
            None
        }
    }
}

fn media_response(media: MediaRead) -> Response {
    let builder = Response::builder()
        .header(CONTENT_TYPE, MEDIA_CONTENT_TYPE)
        .header(CONTENT_LENGTH, media.content_length())
        .header(ACCEPT_RANGES, "bytes");

    let builder = match media.range {
        Some(range) => builder.status(StatusCode::PARTIAL_CONTENT).header(
            CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, media.total_size),
        ),
        None => builder.status(StatusCode::OK),
    };

    builder
        .body(Body::from_stream(media.stream))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build media response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

#[tracing::instrument(skip(state, headers))]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(path) = StoragePath::artifact(&filename) else {
        tracing::debug!("Rejected artifact name");
        return not_found();
    };

    let range = requested_range(&headers);

    match state.media_store.read(&path, range).await {
        Ok(media) => media_response(media),
        Err(StorageError::NotFound(_)) => not_found(),
        Err(StorageError::InvalidRange(RangeError::Unsatisfiable(total_size))) => {
            range_not_satisfiable(total_size)
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Failed to read artifact");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
