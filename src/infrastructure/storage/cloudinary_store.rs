use std::io;

use async_trait::async_trait;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::multipart;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::application::ports::{
    ByteStream, DeleteOutcome, MediaRead, MediaStore, StorageError, single_chunk,
};
use crate::domain::{
    ARTIFACT_EXTENSION, Artifact, ArtifactMetadata, ArtifactReference, ByteRange, RangeError,
    ResolvedRange, StagedUpload, StoragePath, Upload,
};
use crate::infrastructure::HttpTimeouts;
use crate::infrastructure::observability::sanitize_upstream_body;

const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";
const RESOURCE_TYPE: &str = "video";

#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Media host store. Objects are video resources keyed `<folder>/<storage path>`.
pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    credentials: CloudinaryCredentials,
    folder: String,
    api_base_url: String,
    delivery_base_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Signs request parameters the way the upload API expects:
/// sorted `key=value` pairs joined by `&`, secret appended, SHA-1 hex.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha1::digest(format!("{}{}", to_sign, api_secret).as_bytes());
    format!("{:x}", digest)
}

/// Parses `bytes start-end/total` or `bytes */total`.
fn parse_content_range(value: &str) -> Option<(Option<ResolvedRange>, u64)> {
    let spec = value.trim().strip_prefix("bytes ")?;
    let (window, total) = spec.split_once('/')?;
    let total = total.trim().parse::<u64>().ok()?;
    if window.trim() == "*" {
        return Some((None, total));
    }
    let (start, end) = window.split_once('-')?;
    let range = ResolvedRange {
        start: start.trim().parse().ok()?,
        end: end.trim().parse().ok()?,
    };
    Some((Some(range), total))
}

impl CloudinaryMediaStore {
    pub fn new(
        credentials: CloudinaryCredentials,
        folder: String,
        api_base_url: Option<String>,
        delivery_base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, StorageError> {
        let client = timeouts
            .build_client()
            .map_err(|e| StorageError::Misconfigured(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            folder: folder.trim_matches('/').to_string(),
            api_base_url: api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            delivery_base_url: delivery_base_url
                .unwrap_or_else(|| DEFAULT_DELIVERY_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Host-side id: the storage path under the folder, minus the file extension.
    pub fn public_id(&self, path: &StoragePath) -> String {
        let raw = path.as_str();
        let name_start = raw.rfind('/').map_or(0, |i| i + 1);
        let keyed = match raw[name_start..].rfind('.') {
            Some(dot) if dot > 0 => &raw[..name_start + dot],
            _ => raw,
        };
        format!("{}/{}", self.folder, keyed)
    }

    pub fn delivery_url(&self, path: &StoragePath) -> String {
        format!(
            "{}/{}/{}/upload/{}/{}",
            self.delivery_base_url,
            self.credentials.cloud_name,
            RESOURCE_TYPE,
            self.folder,
            path
        )
    }

    fn api_url(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base_url, self.credentials.cloud_name, RESOURCE_TYPE, action
        )
    }

    async fn upload(
        &self,
        path: &StoragePath,
        stream: ByteStream,
        content_type: &str,
        format: Option<&str>,
    ) -> Result<UploadResponse, StorageError> {
        let mut params: Vec<(&'static str, String)> = vec![
            ("public_id", self.public_id(path)),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        if let Some(format) = format {
            params.push(("format", format.to_string()));
        }
        let signature = sign_params(&params, &self.credentials.api_secret);

        let part = multipart::Part::stream(reqwest::Body::wrap_stream(stream))
            .file_name(path.file_name().to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.api_url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "status {}: {}",
                status,
                sanitize_upstream_body(&body)
            )));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("body: {}", e)))
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn stage(&self, upload: Upload) -> Result<StagedUpload, StorageError> {
        let path = StoragePath::for_upload(&upload.filename);
        let size_bytes = upload.size_bytes();

        let uploaded = self
            .upload(&path, single_chunk(upload.data), &upload.content_type, None)
            .await?;
        tracing::debug!(url = %uploaded.secure_url, "Upload staged on media host");

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
        let uploaded = self
            .upload(&path, stream, metadata.content_type, Some(ARTIFACT_EXTENSION))
            .await?;

        tracing::debug!(url = %uploaded.secure_url, "Dubbed artifact uploaded to media host");

        Ok(Artifact::new(
            path,
            ArtifactReference::Url(uploaded.secure_url),
            uploaded.bytes,
        ))
    }

    async fn delete(&self, path: &StoragePath) -> Result<DeleteOutcome, StorageError> {
        let mut params: Vec<(&'static str, String)> = vec![
            ("public_id", self.public_id(path)),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = sign_params(&params, &self.credentials.api_secret);
        params.push(("api_key", self.credentials.api_key.clone()));
        params.push(("signature", signature));

        let response = self
            .client
            .post(self.api_url("destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::DeleteFailed(format!(
                "status {}: {}",
                status,
                sanitize_upstream_body(&body)
            )));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("body: {}", e)))?;

        match destroyed.result.as_str() {
            "ok" => Ok(DeleteOutcome::Deleted),
            "not found" => Ok(DeleteOutcome::NotFound),
            other => Err(StorageError::DeleteFailed(format!(
                "unexpected destroy result: {}",
                other
            ))),
        }
    }

    async fn read(
        &self,
        path: &StoragePath,
        range: Option<ByteRange>,
    ) -> Result<MediaRead, StorageError> {
        let mut request = self.client.get(self.delivery_url(path));
        if let Some(range) = range {
            request = request.header(RANGE, range.to_header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("request: {}", e)))?;

        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(path.to_string())),
            StatusCode::RANGE_NOT_SATISFIABLE => {
                let total = content_range.map(|(_, total)| total).unwrap_or(0);
                Err(StorageError::InvalidRange(RangeError::Unsatisfiable(total)))
            }
            StatusCode::PARTIAL_CONTENT => {
                let (resolved, total_size) = content_range.ok_or_else(|| {
                    StorageError::DownloadFailed("partial response without Content-Range".into())
                })?;
                Ok(MediaRead {
                    total_size,
                    range: resolved,
                    stream: response.bytes_stream().map_err(io::Error::other).boxed(),
                })
            }
            status if status.is_success() => {
                let total_size = response.content_length().ok_or_else(|| {
                    StorageError::DownloadFailed("response without Content-Length".into())
                })?;
                Ok(MediaRead {
                    total_size,
                    range: None,
                    stream: response.bytes_stream().map_err(io::Error::other).boxed(),
                })
            }
            status => Err(StorageError::DownloadFailed(format!("status {}", status))),
        }
    }
}
