use std::io;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{ByteStream, DubbingClient, DubbingClientError, MediaSubmission};
use crate::domain::{DubStatus, RemoteJobId};
use crate::infrastructure::HttpTimeouts;
use crate::infrastructure::observability::sanitize_upstream_body;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const API_KEY_HEADER: &str = "xi-api-key";

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    watermark: bool,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    dubbing_id: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    dubbing_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, DubbingClientError> {
        let client = timeouts
            .build_client()
            .map_err(|e| DubbingClientError::Transfer(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            watermark: true,
        })
    }

    pub fn with_watermark(mut self, watermark: bool) -> Self {
        self.watermark = watermark;
        self
    }

    fn job_url(&self, job_id: &RemoteJobId) -> String {
        format!("{}/v1/dubbing/{}", self.base_url, job_id)
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        format!("status {}: {}", status, sanitize_upstream_body(&body))
    }
}

#[async_trait]
impl DubbingClient for ElevenLabsClient {
    async fn submit(
        &self,
        media: MediaSubmission,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RemoteJobId, DubbingClientError> {
        let url = format!("{}/v1/dubbing", self.base_url);

        let body = reqwest::Body::wrap_stream(media.stream);
        let part = match media.content_length {
            Some(len) => multipart::Part::stream_with_length(body, len),
            None => multipart::Part::stream(body),
        }
        .file_name(media.filename)
        .mime_str(&media.content_type)
        .map_err(|e| DubbingClientError::Submission(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("source_lang", source_lang.to_string())
            .text("target_lang", target_lang.to_string())
            .text("watermark", self.watermark.to_string());

        tracing::debug!(source_lang, target_lang, "Submitting media to ElevenLabs dubbing");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DubbingClientError::Submission(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(DubbingClientError::Submission(
                Self::error_body(response).await,
            ));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| DubbingClientError::Submission(format!("body: {}", e)))?;

        submitted
            .dubbing_id
            .and_then(RemoteJobId::new)
            .ok_or_else(|| DubbingClientError::Submission("Failed to start dubbing".to_string()))
    }

    async fn poll_status(&self, job_id: &RemoteJobId) -> Result<DubStatus, DubbingClientError> {
        let response = self
            .client
            .get(self.job_url(job_id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DubbingClientError::Transfer(format!("poll request: {}", e)))?;

        if !response.status().is_success() {
            return Err(DubbingClientError::Transfer(Self::error_body(response).await));
        }

        let polled: StatusResponse = response
            .json()
            .await
            .map_err(|e| DubbingClientError::Transfer(format!("poll body: {}", e)))?;

        if let Some(reported) = polled.dubbing_id.as_deref() {
            if reported != job_id.as_str() {
                tracing::warn!(reported, "Status response carries a different dubbing id");
            }
        }

        match polled.status.parse::<DubStatus>() {
            Ok(DubStatus::Failed) => {
                tracing::error!(
                    error = polled.error.as_deref().unwrap_or("none"),
                    "Dubbing failed at ElevenLabs"
                );
                Ok(DubStatus::Failed)
            }
            Ok(status) => Ok(status),
            Err(_) => {
                tracing::debug!(status = %polled.status, "Unrecognised dubbing status, still waiting");
                Ok(DubStatus::Dubbing)
            }
        }
    }

    async fn fetch_result(
        &self,
        job_id: &RemoteJobId,
        target_lang: &str,
    ) -> Result<ByteStream, DubbingClientError> {
        let url = format!("{}/audio/{}", self.job_url(job_id), target_lang);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DubbingClientError::Transfer(format!("fetch request: {}", e)))?;

        if !response.status().is_success() {
            return Err(DubbingClientError::Transfer(Self::error_body(response).await));
        }

        tracing::debug!(
            content_length = response.content_length(),
            "Streaming dubbed media from ElevenLabs"
        );

        Ok(response.bytes_stream().map_err(io::Error::other).boxed())
    }
}
